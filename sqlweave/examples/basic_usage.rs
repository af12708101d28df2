use sqlweave::{new_query, op, resolve_aliases, SortDirection, Value, WhereConnector};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== sqlweave - Basic Usage ===\n");

    // SELECT over a join; the wildcard expands per alias
    let orders = new_query()
        .select("orders:o", "*")
        .join("customers:c", ("o.customer_id", "c.id"))?
        .where_(WhereConnector::None, "c.country", op::EQ, "IT")
        .or_where(("o.total", op::GT, 100))
        .order("o.created_at", SortDirection::Desc)
        .pagination(10, 3);

    println!("1. SELECT with join:");
    println!("   SQL: {}", orders.render()?);
    let bound = orders.render_bound()?;
    println!("   Bound: {}", bound.sql);
    println!("   Parameters: {:?}", bound.params);
    println!("   Aliases: {:?}\n", resolve_aliases(&bound.sql));

    // INSERT keeps column call order
    let insert = new_query()
        .insert("customers", "name", "O'Brien")
        .insert("customers", "country", "IE")
        .insert("customers", "created_at", Value::expr("NOW()"))
        .ignore_duplicates(true);
    println!("2. INSERT:");
    println!("   SQL: {}\n", insert.render()?);

    // UPDATE
    let update = new_query()
        .update("customers", "visits", Value::expr("visits + 1"))
        .where_(WhereConnector::None, "id", op::EQ, 42);
    println!("3. UPDATE:");
    println!("   SQL: {}\n", update.render()?);

    // DELETE refuses to run without a predicate
    println!("4. DELETE:");
    match new_query().delete("customers").render() {
        Ok(sql) => println!("   SQL: {}", sql),
        Err(err) => println!("   Refused: {}", err),
    }
    let delete = new_query()
        .delete("customers")
        .where_(WhereConnector::None, "name", op::LIKE, "test");
    println!("   SQL: {}", delete.render()?);

    Ok(())
}
