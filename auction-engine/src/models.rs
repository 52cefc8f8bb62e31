use {
    sqlx::{
        types::time::PrimitiveDateTime,
        FromRow,
    },
    uuid::Uuid,
};

pub type UserId = Uuid;

#[derive(Clone, Debug, FromRow)]
pub struct User {
    pub id:            UserId,
    pub name:          String,
    pub email:         String,
    #[allow(dead_code)]
    pub creation_time: PrimitiveDateTime,
}
