#[cfg(feature = "sqlite")]
use serde::Deserialize;
#[cfg(feature = "sqlite")]
use sqlweave::{connect, new_query, op, Backend, DatabaseConfig, FieldType, Model, ModelDescriptor, WhereConnector};

#[cfg(feature = "sqlite")]
#[derive(Debug, Deserialize)]
struct Customer {
    id: i64,
    name: String,
    vip: bool,
}

#[cfg(feature = "sqlite")]
impl Model for Customer {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new()
            .field("id", FieldType::Integer)
            .field("name", FieldType::String)
            .field("vip", FieldType::Boolean)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "sqlite")]
    {
        println!("=== sqlweave SQLite - Usage Example ===\n");

        let config = DatabaseConfig {
            backend: Backend::Sqlite,
            max_connections: 1,
            ..DatabaseConfig::default()
        };
        let mut db = connect(&config).await?;

        db.execute_sql("CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT, vip INTEGER)")
            .await?;

        for (name, vip) in [("Acme", true), ("Globex", false), ("Initech", true)] {
            let outcome = db
                .execute(
                    &new_query()
                        .insert("customers", "name", name)
                        .insert("customers", "vip", vip),
                )
                .await?;
            println!("Inserted {} as id {:?}", name, outcome.last_insert_id);
        }

        let vips: Vec<Customer> = db
            .fetch_models(
                &new_query()
                    .select("customers", "*")
                    .where_(WhereConnector::None, "vip", op::EQ, true),
            )
            .await?;
        println!("\nVIP customers ({} rows):", db.row_count());
        for customer in &vips {
            println!("   {:?}", customer);
        }
        println!("First name: {:?}", db.first_value("name"));
    }

    #[cfg(not(feature = "sqlite"))]
    {
        println!("This example requires the 'sqlite' feature.");
        println!("Run with: cargo run --example sqlite_usage --features sqlite");
    }

    Ok(())
}
