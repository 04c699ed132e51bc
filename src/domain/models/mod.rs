pub mod acl;
pub mod bucket;
pub mod cdn;
pub mod filter;
pub mod multipart;
pub mod object;
pub mod options;
pub mod policy;
pub mod website;

pub use acl::*;
pub use bucket::*;
pub use cdn::*;
pub use filter::*;
pub use multipart::*;
pub use object::*;
pub use options::*;
pub use policy::*;
pub use website::*;
