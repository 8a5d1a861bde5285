pub mod client;
pub mod parser;

pub use client::NetflixClient;
pub use parser::{parse_title, ParsedTitle, TitleOverride, TITLE_OVERRIDES};
