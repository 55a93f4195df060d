//! Chain access: the signing client and the SimpleStorage calls

pub mod abi;
pub mod client;
pub mod reader;
pub mod sender;
