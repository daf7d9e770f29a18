use shared::{
    error::{ApiException, ErrorCode},
    protocol::{PostPayload, RemotePost},
};

/// Read-only seed collection behind the mock `/posts` endpoints.
///
/// Writes are acknowledged but never stored, the way public placeholder APIs
/// behave: creates always come back with the id one past the seed, updates
/// only succeed for seeded ids, deletes always succeed.
#[derive(Debug, Clone)]
pub struct PostsCatalog {
    posts: Vec<RemotePost>,
}

impl PostsCatalog {
    pub fn seeded(count: usize) -> Self {
        let posts = (1..=count as i64)
            .map(|id| RemotePost {
                id: Some(id),
                title: Some(format!("post {id}")),
                body: Some(format!("body of post {id}")),
            })
            .collect();
        Self { posts }
    }

    pub fn from_posts(posts: Vec<RemotePost>) -> Self {
        Self { posts }
    }

    pub fn list(&self) -> &[RemotePost] {
        &self.posts
    }

    pub fn contains(&self, id: i64) -> bool {
        self.posts.iter().any(|post| post.id == Some(id))
    }

    /// Id every create is answered with.
    pub fn next_id(&self) -> i64 {
        self.posts
            .iter()
            .filter_map(|post| post.id)
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn create(&self, payload: PostPayload) -> Result<RemotePost, ApiException> {
        validate(&payload)?;
        Ok(RemotePost {
            id: Some(self.next_id()),
            title: Some(payload.title),
            body: Some(payload.body),
        })
    }

    pub fn update(&self, id: i64, payload: PostPayload) -> Result<RemotePost, ApiException> {
        if !self.contains(id) {
            return Err(ApiException::new(
                ErrorCode::Internal,
                format!("post {id} does not exist"),
            ));
        }
        validate(&payload)?;
        Ok(RemotePost {
            id: Some(id),
            title: Some(payload.title),
            body: Some(payload.body),
        })
    }
}

fn validate(payload: &PostPayload) -> Result<(), ApiException> {
    if payload.title.trim().is_empty() {
        return Err(ApiException::new(
            ErrorCode::Validation,
            "title must not be empty",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
