
pub use harness::{profile_doc, SessionHarness};
