// Resume parsing: text extraction seam, keyword/contact extraction, and
// memoization through the shared TTL cache.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod keywords;
pub mod parser;

pub use error::ResumeError;
