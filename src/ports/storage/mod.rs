mod cloud_bucket;

pub use cloud_bucket::CloudBucket;
