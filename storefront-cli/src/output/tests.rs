//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::Pricing;
    use super::super::text::TextFormatter;
    use rust_decimal::Decimal;
    use storefront_core::{
        CartSnapshot, CurrencyCode, CurrencyRate, HomeListings, NewCartLine, OrderState,
        OrderStatus, Product, ProductRef, ProductSummary, RateTable, VariantSelection,
    };
    use storefront_store::FeedSource;

    fn rates() -> RateTable {
        RateTable::new(vec![
            CurrencyRate::new(CurrencyCode::Ngn, "₦", Decimal::ONE).as_default(),
            CurrencyRate::new(CurrencyCode::Usd, "$", Decimal::new(1500, 0)),
        ])
    }

    fn cart() -> CartSnapshot {
        let mut cart = CartSnapshot::new();
        cart.add(
            NewCartLine::new(
                ProductRef::new(1, "Ankara Shirt", "ankara-shirt", Decimal::new(30_000, 0)),
                2,
            )
            .with_size(VariantSelection::new(3, "L")),
        );
        cart
    }

    #[test]
    fn test_empty_cart() {
        let formatter = TextFormatter::new(false);
        let pricing = Pricing::new(rates(), CurrencyCode::Ngn);
        let output = formatter.format_cart(&CartSnapshot::new().view(), &pricing);
        assert_eq!(output, "Your cart is empty");
    }

    #[test]
    fn test_cart_in_base_currency() {
        let formatter = TextFormatter::new(false);
        let pricing = Pricing::new(rates(), CurrencyCode::Ngn);
        let output = formatter.format_cart(&cart().view(), &pricing);

        assert!(output.contains("Ankara Shirt (L)"));
        assert!(output.contains("₦60,000.00"));
        assert!(output.contains("2 items"));
    }

    #[test]
    fn test_cart_in_selected_currency() {
        let formatter = TextFormatter::new(false);
        let pricing = Pricing::new(rates(), CurrencyCode::Usd);
        let output = formatter.format_cart(&cart().view(), &pricing);
        assert!(output.contains("$40.00"));
    }

    #[test]
    fn test_currency_without_rates() {
        let formatter = TextFormatter::new(false);
        let pricing = Pricing::new(RateTable::default(), CurrencyCode::Gbp);
        let output = formatter.format_currency(&pricing, &RateTable::default());
        assert!(output.contains("GBP"));
        assert!(output.contains("No rates loaded"));
    }

    #[test]
    fn test_stale_listings_are_flagged() {
        let formatter = TextFormatter::new(false);
        let pricing = Pricing::new(rates(), CurrencyCode::Ngn);
        let output =
            formatter.format_listings(&HomeListings::default(), FeedSource::Stale, None, &pricing);
        assert!(output.contains("stale"));
        assert!(output.contains("Best Sellers (0)"));
    }

    #[test]
    fn test_order_status() {
        let formatter = TextFormatter::new(false);
        let pricing = Pricing::new(rates(), CurrencyCode::Usd);
        let status = OrderStatus {
            reference: "ORD-9".to_string(),
            state: OrderState::Shipped,
            total: Some(Decimal::new(3000, 0)),
            placed_at: None,
            item_count: 3,
        };
        let output = formatter.format_order_status(&status, &pricing);
        assert!(output.contains("Order ORD-9"));
        assert!(output.contains("$2.00"));
    }

    #[test]
    fn test_product_lists_variant_ids() {
        let formatter = TextFormatter::new(false);
        let pricing = Pricing::new(rates(), CurrencyCode::Ngn);
        let product = Product {
            summary: ProductSummary {
                id: 7,
                name: "Loafer".to_string(),
                slug: "loafer".to_string(),
                price: Decimal::new(25_000, 0),
                compare_at_price: Some(Decimal::new(30_000, 0)),
                image: None,
                in_stock: false,
            },
            description: "Hand-stitched.".to_string(),
            images: Vec::new(),
            sizes: vec![VariantSelection::new(2, "43"), VariantSelection::new(3, "44")],
            colors: Vec::new(),
        };

        let output = formatter.format_product(&product, &pricing);
        assert!(output.contains("Price:   ₦25,000.00 was ₦30,000.00"));
        assert!(output.contains("Sizes:   2=43  3=44"));
        assert!(output.contains("Sold out"));
        assert!(!output.contains("Colors"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::Pricing;
    use super::super::json::JsonFormatter;
    use rust_decimal::Decimal;
    use storefront_core::{CartSnapshot, CurrencyCode, NewCartLine, ProductRef, RateTable};

    #[test]
    fn test_cart_output_shape() {
        let mut cart = CartSnapshot::new();
        cart.add(NewCartLine::new(
            ProductRef::new(5, "Cap", "cap", Decimal::new(4_999, 2)),
            3,
        ));

        let formatter = JsonFormatter::new(false);
        let pricing = Pricing::new(RateTable::default(), CurrencyCode::Ngn);
        let output = formatter.cart_output(&cart.view(), &pricing);
        let json: serde_json::Value =
            serde_json::from_str(&formatter.format(&output).unwrap()).unwrap();

        assert_eq!(json["currency"], "NGN");
        assert_eq!(json["totalQuantity"], 3);
        assert_eq!(json["displayTotal"], "₦149.97");
        assert_eq!(json["lines"][0]["productId"], 5);
        assert!(json["lines"][0].get("size").is_none());
    }
}
