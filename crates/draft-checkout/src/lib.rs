//! Draft support for the checkout builder.
//!
//! Provides the builder's default form, the storage keys used for new and
//! edited checkouts, and the rules for resuming a saved edit draft.
//!
//! ```ignore
//! use draft_checkout::{DraftKey, open_checkout, resume_or_discard};
//!
//! let mut store = open_checkout(&DraftKey::New, storage);
//! let outcome = resume_or_discard(&mut store, "42", server_checkout)?;
//! ```

mod key;
mod resume;
mod shape;

pub use key::{CHECKOUT_DEBOUNCE, DraftKey, DraftKeyError, checkout_autosave};
pub use resume::{
    ResumeOutcome, attach_deliverable, is_resumable, open_checkout, remove_deliverable,
    resume_or_discard, start_new_checkout,
};
pub use shape::{DeliverableType, checkout_shape, default_package};
