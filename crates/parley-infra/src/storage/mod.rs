//! Blob-storage adapters: Supabase signed URLs and plain HTTP media fetch.

pub mod fetch;
pub mod supabase;

pub use fetch::HttpMediaFetcher;
pub use supabase::SupabaseSigner;
