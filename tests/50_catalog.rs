mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn catalog_tables_list_and_fetch() -> Result<()> {
    let server = common::spawn_server().await?;

    for table in ["mazmorras", "equipamiento", "recursos", "bestiario", "oficios", "clases"] {
        let (status, body) = server.get(&format!("/{}", table)).await?;
        assert_eq!(status, StatusCode::OK, "listing {}", table);
        assert!(body.as_array().is_some_and(|rows| !rows.is_empty()), "{} should be seeded", table);

        let (status, body) = server.get(&format!("/{}/1", table)).await?;
        assert_eq!(status, StatusCode::OK, "fetching {}/1", table);
        assert_eq!(body["id"], 1);
    }

    let (_, body) = server.get("/mazmorras/1").await?;
    assert_eq!(body["nivel_minimo"], 5);

    Ok(())
}

#[tokio::test]
async fn catalog_missing_ids_are_not_found() -> Result<()> {
    let server = common::spawn_server().await?;

    for (path, detail) in [
        ("/mazmorras/50", "Dungeon not found"),
        ("/equipamiento/50", "Equipment not found"),
        ("/recursos/50", "Resource not found"),
        ("/bestiario/50", "Bestiary entry not found"),
    ] {
        let (status, body) = server.get(path).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", path);
        assert_eq!(body["detail"], detail);
    }

    Ok(())
}
