use {
    super::Repository,
    crate::{
        api::RestError,
        models::{
            User,
            UserId,
        },
    },
};

impl Repository {
    pub async fn get_user(&self, user_id: UserId) -> Result<User, RestError> {
        self.db.get_user(user_id).await
    }
}
