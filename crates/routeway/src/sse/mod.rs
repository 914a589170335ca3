mod decoder;
mod frame;
mod lines;
mod reader;

pub use decoder::Utf8Decoder;
pub use frame::{EventFrameParser, Frame, COMMENT_PREFIX, DATA_PREFIX, DONE_SENTINEL};
pub use lines::LineAssembler;
pub use reader::BodyReader;
