pub mod error;
pub mod models {
    pub mod hook;
    pub mod vote;
}
pub mod statistics {
    pub mod client;
}
pub mod components {
    pub mod hook_statistics;
}
#[cfg(feature = "ssr")]
pub mod config;
#[cfg(feature = "ssr")]
pub mod content {
    pub mod assets;
    pub mod builder;
    pub mod frontmatter;
    pub mod highlight;
    pub mod schema;
    pub mod slug;
    pub mod transform;
}
