pub mod flash;

pub use flash::create_session_layer;
