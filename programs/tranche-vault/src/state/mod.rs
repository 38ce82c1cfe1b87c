pub mod position;
pub mod protocol_config;
pub mod vault_state;

pub use position::*;
pub use protocol_config::*;
pub use vault_state::*;
