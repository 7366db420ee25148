//! End-to-end flow through the public API: load configuration from a folder,
//! connect, build the job from config, and run it against a seeded table.

use sea_orm::{ConnectionTrait, DbConn, Statement};
use spartan_reset::{config::Config, db, environment::Environment, task::Outcome, task::ResetJob};
use tree_fs::TreeBuilder;

fn config_yaml(root: &std::path::Path) -> String {
    format!(
        r#"
app_name: spartans
logger:
  enable: false
  level: warn
  format: compact
database:
  uri: sqlite://{root}/spartans.sqlite?mode=rwc
  enable_logging: false
  connect_timeout: 500
  idle_timeout: 500
  min_connections: 1
  max_connections: 1
reset:
  table: spartans
  seed_path: {root}/data.sql
  schedule: "59 59 23 * * ?"
  timezone: America/New_York
"#,
        root = root.display()
    )
}

async fn ids(db: &DbConn) -> Vec<i32> {
    let rows = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            "SELECT id FROM spartans ORDER BY id",
        ))
        .await
        .expect("query ids");
    rows.iter()
        .map(|row| row.try_get::<i32>("", "id").expect("id column"))
        .collect()
}

#[tokio::test]
async fn reset_flow_from_config_to_table() {
    let tree = TreeBuilder::default()
        .add(
            "data.sql",
            "INSERT INTO spartans (id, name) VALUES (1, 'leonidas');\n\
             INSERT INTO spartans (id, name) VALUES (2, 'gorgo');\n\
             INSERT INTO spartans (id, name) VALUES (3, 'dienekes');",
        )
        .create()
        .expect("create fixture tree");

    fs_err::write(tree.root.join("test.yaml"), config_yaml(&tree.root)).expect("write config");

    let config = Config::from_folder(&Environment::Test, &tree.root).expect("load config");
    let db = db::connect(&config.database).await.expect("connect");

    db.execute_unprepared(
        "CREATE TABLE spartans (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL);",
    )
    .await
    .expect("create table");
    db.execute_unprepared("INSERT INTO spartans (id, name) VALUES (1, 'a'), (2, 'b'), (5, 'c');")
        .await
        .expect("preexisting rows");

    let job = ResetJob::from_config(&config).expect("build job");
    assert_eq!(job.run(&db).await, Outcome::Completed);

    assert_eq!(ids(&db).await, vec![1, 2, 3]);

    // the identity sequence follows the reloaded rows
    db.execute_unprepared("INSERT INTO spartans (name) VALUES ('probe');")
        .await
        .expect("probe insert");
    assert_eq!(ids(&db).await, vec![1, 2, 3, 4]);
}
