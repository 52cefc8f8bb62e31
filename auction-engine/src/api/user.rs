use {
    crate::{
        api::{
            ErrorBodyResponse,
            RestError,
        },
        auction::service::{
            get_user::GetUserInput,
            Service,
        },
        models,
    },
    axum::{
        extract::{
            Path,
            State,
        },
        Json,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    utoipa::ToSchema,
};

#[derive(Serialize, Deserialize, ToSchema, Clone)]
pub struct User {
    #[schema(example = "ceedceed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:    models::UserId,
    #[schema(example = "Ada")]
    pub name:  String,
    #[schema(example = "ada@example.com")]
    pub email: String,
}

impl From<models::User> for User {
    fn from(user: models::User) -> Self {
        Self {
            id:    user.id,
            name:  user.name,
            email: user.email,
        }
    }
}

/// Fetch a user by id.
#[utoipa::path(get, path = "/v1/users/{user_id}",
    params(("user_id" = String, description = "User id to query for")),
    responses(
    (status = 200, description = "The user", body = User),
    (status = 404, description = "User was not found", body = ErrorBodyResponse),
),)]
pub async fn get_user(
    State(service): State<Service>,
    Path(user_id): Path<models::UserId>,
) -> Result<Json<User>, RestError> {
    let user = service.get_user(GetUserInput { user_id }).await?;
    Ok(Json(user.into()))
}
