mod file;
mod play;
mod playback;
mod web;

pub use self::file::FileCommand;
pub use self::play::PlayCommand;
pub use self::web::WebCommand;
