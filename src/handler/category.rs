use crate::handler::db::DatabaseService;
use crate::model::{category::Category, errors::ResError};

impl DatabaseService {
    pub async fn get_categories(&self) -> Result<Vec<Category>, ResError> {
        let client = self.client().await?;
        client
            .query(
                "SELECT id, name, description, icon, color, topic_count, post_count,
                    created_at, updated_at
                FROM forum_categories
                ORDER BY name ASC",
                &[],
            )
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }
}
