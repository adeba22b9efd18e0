//! Library surface of the scheduling CLI; the binary lives in `main.rs`.

pub mod logging;
