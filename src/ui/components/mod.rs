pub mod date_input;
pub mod form;
pub mod list;

pub use date_input::{DateInputState, render_date_input};
pub use form::{FieldKind, FormEvent, FormField, FormState, render_form};
pub use list::SelectList;
