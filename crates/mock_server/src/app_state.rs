use crate::api::PostsCatalog;

pub struct AppState {
    pub catalog: PostsCatalog,
    /// Answer `GET /posts` with 503.
    pub fail_reads: bool,
    /// Answer every POST, PUT and DELETE with 503.
    pub fail_writes: bool,
}

impl AppState {
    pub fn new(catalog: PostsCatalog) -> Self {
        Self {
            catalog,
            fail_reads: false,
            fail_writes: false,
        }
    }
}
