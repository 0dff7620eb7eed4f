//! End-to-end tests for the Items page.

use tillhouse_integration_tests::TestContext;

#[tokio::test]
async fn test_items_page_shows_grid_with_low_stock_badge() {
    let ctx = TestContext::spawn().await;
    ctx.seed_item(1, "Black Tea 500g", "450.00", 12).await;
    ctx.seed_item(2, "Chocolate Biscuit", "120.50", 3).await;

    let resp = ctx
        .client
        .get(ctx.url("/items"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), 200);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Black Tea 500g"));
    assert!(body.contains("Rs 450.00"));
    assert_eq!(
        body.matches("badge-low").count(),
        1,
        "only the 3-in-stock item is flagged"
    );
}

#[tokio::test]
async fn test_search_and_sort() {
    let ctx = TestContext::spawn().await;
    ctx.seed_item(1, "Black Tea 500g", "450.00", 12).await;
    ctx.seed_item(2, "Chocolate Biscuit", "120.50", 3).await;
    ctx.seed_item(3, "Condensed Milk", "280.00", 7).await;

    let resp = ctx
        .client
        .get(ctx.url("/items?q=tea"))
        .send()
        .await
        .expect("request failed");
    let body = resp.text().await.expect("body");
    assert!(body.contains("Black Tea 500g"));
    assert!(!body.contains("Condensed Milk"));

    let resp = ctx
        .client
        .get(ctx.url("/items?sort=priceAsc"))
        .send()
        .await
        .expect("request failed");
    let body = resp.text().await.expect("body");
    let biscuit = body.find("Chocolate Biscuit").expect("biscuit row");
    let milk = body.find("Condensed Milk").expect("milk row");
    let tea = body.find("Black Tea 500g").expect("tea row");
    assert!(biscuit < milk && milk < tea, "cheapest first");

    let resp = ctx
        .client
        .get(ctx.url("/items?sort=qtyDesc"))
        .send()
        .await
        .expect("request failed");
    let body = resp.text().await.expect("body");
    let tea = body.find("Black Tea 500g").expect("tea row");
    let biscuit = body.find("Chocolate Biscuit").expect("biscuit row");
    assert!(tea < biscuit, "largest stock first");
}

#[tokio::test]
async fn test_create_item_redirects_with_flash() {
    let ctx = TestContext::spawn().await;

    let resp = ctx
        .client
        .post(ctx.url("/items"))
        .form(&[
            ("description", "Black Tea 500g"),
            ("unit_price", "450.00"),
            ("qty_on_hand", "12"),
        ])
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), 200);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Item saved"));

    let items = ctx.backend.items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].description, "Black Tea 500g");
    assert_eq!(items[0].qty_on_hand, 12);
}

#[tokio::test]
async fn test_create_validation_messages() {
    let ctx = TestContext::spawn().await;

    let resp = ctx
        .client
        .post(ctx.url("/items"))
        .form(&[
            ("description", "Black Tea 500g"),
            ("unit_price", "0"),
            ("qty_on_hand", "12"),
        ])
        .send()
        .await
        .expect("request failed");
    // `>` renders as &#62; in the escaped body
    assert!(resp.text().await.expect("body").contains("Unit Price &#62; 0"));

    let resp = ctx
        .client
        .post(ctx.url("/items"))
        .form(&[
            ("description", "Black Tea 500g"),
            ("unit_price", "450.00"),
            ("qty_on_hand", "-1"),
        ])
        .send()
        .await
        .expect("request failed");
    assert!(resp.text().await.expect("body").contains("Qty &#62;= 0"));

    assert!(ctx.backend.items().await.is_empty());
}

#[tokio::test]
async fn test_edit_prefills_form() {
    let ctx = TestContext::spawn().await;
    ctx.seed_item(1, "Black Tea 500g", "450.00", 12).await;

    let resp = ctx
        .client
        .get(ctx.url("/items?edit=1"))
        .send()
        .await
        .expect("request failed");

    let body = resp.text().await.expect("body");
    assert!(body.contains("Edit Item"));
    assert!(body.contains(r#"value="450.00""#));
    assert!(body.contains(r#"action="/items/1""#));
}

#[tokio::test]
async fn test_update_item() {
    let ctx = TestContext::spawn().await;
    ctx.seed_item(1, "Black Tea 500g", "450.00", 12).await;

    let resp = ctx
        .client
        .post(ctx.url("/items/1"))
        .form(&[
            ("description", "Black Tea 1kg"),
            ("unit_price", "820.00"),
            ("qty_on_hand", "6"),
        ])
        .send()
        .await
        .expect("request failed");

    let body = resp.text().await.expect("body");
    assert!(body.contains("Item updated"));

    let items = ctx.backend.items().await;
    assert_eq!(items[0].description, "Black Tea 1kg");
    assert_eq!(items[0].qty_on_hand, 6);
}

#[tokio::test]
async fn test_delete_item() {
    let ctx = TestContext::spawn().await;
    ctx.seed_item(1, "Black Tea 500g", "450.00", 12).await;

    let resp = ctx
        .client
        .post(ctx.url("/items/1/delete"))
        .send()
        .await
        .expect("request failed");

    let body = resp.text().await.expect("body");
    assert!(body.contains("Item deleted"));
    assert!(ctx.backend.items().await.is_empty());
}
