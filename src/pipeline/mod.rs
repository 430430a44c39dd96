//! Pipeline stages for turning a question paper into solutions.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ probe ──▶ intake ──▶ extract ──▶ generate
//!            (gate)    (policy)   │            (LLM)
//!                                 ├─ pdf      (lopdf)
//!                                 ├─ ocr      (image + tesseract)
//!                                 └─ text     (passthrough)
//! ```
//!
//! 1. [`input`]: request-scoped submission types
//! 2. [`probe`]: one round trip to the AI backend before any other work
//! 3. [`intake`]: media-type and size policy, checked before extraction
//! 4. [`extract`]: route to the matching backend and reject blank results
//! 5. [`generate`]: build the tutoring prompt and call the backend
//!
//! [`llm`] holds the backend seam and failure classification shared by
//! `probe` and `generate`; [`normalise`] cleans PDF and OCR text.

pub mod extract;
pub mod generate;
pub mod input;
pub mod intake;
pub mod llm;
pub mod normalise;
pub mod ocr;
pub mod pdf;
pub mod probe;
pub mod text;
