mod app_id;
mod bucket_name;
mod object_key;

pub use app_id::AppId;
pub use bucket_name::BucketName;
pub use object_key::ObjectKey;
