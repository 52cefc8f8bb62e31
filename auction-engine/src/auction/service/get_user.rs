use {
    super::Service,
    crate::{
        api::RestError,
        models::{
            User,
            UserId,
        },
    },
};

pub struct GetUserInput {
    pub user_id: UserId,
}

impl Service {
    pub async fn get_user(&self, input: GetUserInput) -> Result<User, RestError> {
        self.repo.get_user(input.user_id).await
    }
}
