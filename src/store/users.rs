use crate::error::Result;
use crate::models::{User, UserIn};
use crate::store::Store;
use tracing::info;

impl Store {
    /// Hash `password` with the configured cost and insert the user
    pub async fn create_user(&self, username: &str, password: &str, email: &str) -> Result<User> {
        let input = UserIn::with_password(username, password, email, self.bcrypt_cost).await?;
        let user = self.insert(&input).await?;

        info!("Created user {} (id={})", user.username, user.id);
        Ok(user)
    }

    pub async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.filter_by_username::<User>(username).await?.into_iter().next())
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.filter::<User, _>("email", &email).await?.into_iter().next())
    }

    /// Flip the logged-in flag; saving also refreshes `last_logged_date`
    pub async fn set_logged_in(&self, user: &mut User, logged_in: bool) -> Result<()> {
        user.is_logged_in = logged_in;
        self.save(user).await
    }
}
