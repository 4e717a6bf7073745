pub mod bench_support;

pub use hosted_provider_selector;
