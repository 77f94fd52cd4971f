//! Seeds demo accounts so the server can be exercised end to end.

use anyhow::Result;
use rand::{Rng, distr::Alphanumeric};
use sqlx::SqlitePool;

use followup::{db, directory, directory::Role};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let database_url = dotenv::var("DATABASE_URL")?;
    let pool = db::connect(&database_url).await?;
    db::init(&pool).await?;

    sqlx::query("DELETE FROM messages").execute(&pool).await?;
    sqlx::query("DELETE FROM users").execute(&pool).await?;

    let teacher_password = "teacherpass".to_owned();
    let parent_password: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();

    create_user(&pool, "t_T100", &teacher_password, Role::Teacher, "Ms. Alice").await?;
    create_user(&pool, "p_P100", &parent_password, Role::Parent, "Bob Brown").await?;

    println!("seeded accounts:");
    println!("  t_T100 / {teacher_password} (teacher)");
    println!("  p_P100 / {parent_password} (parent)");

    Ok(())
}

async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password: &str,
    role: Role,
    display_name: &str,
) -> Result<()> {
    let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
    directory::create_user(pool, username, &hash, role, display_name).await?;
    Ok(())
}
