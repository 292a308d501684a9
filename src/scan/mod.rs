//! Share enumeration and video scanning on one host

mod host;
mod shares;
mod tree;

pub use host::{HostScanner, ScanEvent, ScanEventStream, ScanObserver};
pub use shares::{ShareEnumerator, filter_shares};
pub use tree::VideoTreeScanner;
