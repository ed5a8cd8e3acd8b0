//! quizmark — heuristic quiz detection and answer highlighting for web
//! pages.
//!
//! The detector scans rendered HTML for question/answer structures using
//! regex heuristics, guesses the correct choice (explicit markers first,
//! longest text as fallback), and marks it with a CSS class. A static scan
//! runs one pass over a document; a live watch drives a browser page over
//! CDP, keeps reacting to DOM insertions, and answers `getResults` queries
//! from the report surface over a local socket.

pub mod cli;
pub mod detect;
pub mod highlight;
pub mod live;
pub mod report;
