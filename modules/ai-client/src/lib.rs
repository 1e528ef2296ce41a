pub mod openai;
pub mod traits;
pub mod util;

pub use openai::OpenAi;
pub use traits::{ChatAgent, Message, MessageRole};
pub use util::{extract_json_object, strip_code_blocks};
