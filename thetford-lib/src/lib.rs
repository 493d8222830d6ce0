pub mod config;
pub mod constants;
pub mod decoder;
pub mod dispatcher;
pub mod error;
pub mod frame;
pub mod model;
pub mod mqtt;
pub mod sensor;
pub mod source;
pub mod usblini;


pub use config::BridgeConfig;
pub use dispatcher::{Dispatcher, EmissionPolicy, Publisher};
pub use error::BridgeError;
pub use frame::{LinFrame, StatusFrame};
pub use model::Model;
pub use source::{FrameSource, SampleLimit};
pub use usblini::UsbLini;
