//! Browsing: product list, product cards, buying.

use action_dispatch::{sync_handler, Action, EventContext};
use dbot_core::{HandlerError, PriceItem, Response, Result};
use serde_json::{json, Value};

use crate::services::{Catalog, Product, ShopAccount, ShopServices};

fn list_keyboard(catalog: &Catalog) -> Value {
    let rows: Vec<Value> = catalog
        .products()
        .iter()
        .map(|p| {
            json!([{
                "text": format!("{} ({})", p.title, p.price),
                "callback_data": format!("product:{}", p.id)
            }])
        })
        .collect();
    json!({ "inline_keyboard": rows })
}

fn product_keyboard(product: &Product) -> Value {
    json!({
        "inline_keyboard": [[
            { "text": "Buy", "callback_data": format!("buy:{}", product.id) },
            { "text": "Back", "callback_data": "catalog" }
        ]]
    })
}

fn product_card(product: &Product) -> String {
    format!(
        "<b>{}</b>\n{}\nPrice: {}",
        product.title, product.description, product.price
    )
}

fn product_id(raw: Option<&str>) -> Result<u32> {
    raw.and_then(|id| id.parse().ok())
        .ok_or_else(|| HandlerError::InvalidPayload(format!("bad product id: {:?}", raw)).into())
}

fn lookup<'a>(catalog: &'a Catalog, raw: Option<&str>) -> Result<&'a Product> {
    let id = product_id(raw)?;
    catalog
        .get(id)
        .ok_or_else(|| HandlerError::InvalidPayload(format!("unknown product {}", id)).into())
}

pub fn catalog_controller(services: &ShopServices) -> Vec<Action<ShopAccount>> {
    let catalog = services.catalog.clone();
    let start = {
        let catalog = catalog.clone();
        sync_handler(move |ctx: &EventContext<ShopAccount>| {
            Ok(vec![Response::message(format!(
                "Hello, {}! Pick a product:",
                ctx.account.display_name
            ))
            .with_reply_markup(list_keyboard(&catalog))])
        })
    };

    let show_product = {
        let catalog = catalog.clone();
        sync_handler(move |ctx: &EventContext<ShopAccount>| {
            let product = lookup(&catalog, ctx.capture(1))?;
            Ok(vec![Response::photo(product.image_url.clone())
                .with_caption(product_card(product))
                .with_parse_mode("HTML")
                .with_reply_markup(product_keyboard(product))])
        })
    };

    let open_product = {
        let catalog = catalog.clone();
        sync_handler(move |ctx: &EventContext<ShopAccount>| {
            let product = lookup(&catalog, ctx.parts().get(1).map(String::as_str))?;
            Ok(vec![Response::edit_message_text(product_card(product))
                .with_parse_mode("HTML")
                .with_reply_markup(product_keyboard(product))])
        })
    };

    let back_to_list = {
        let catalog = catalog.clone();
        sync_handler(move |_ctx: &EventContext<ShopAccount>| {
            Ok(vec![Response::edit_message_text("Pick a product:")
                .with_reply_markup(list_keyboard(&catalog))])
        })
    };

    let buy = sync_handler(move |ctx: &EventContext<ShopAccount>| {
        let product = lookup(&catalog, ctx.parts().get(1).map(String::as_str))?;
        Ok(vec![
            Response::edit_message_reply_markup(None),
            Response::invoice(
                product.title.clone(),
                product.description.clone(),
                format!("order:{}:{}", product.id, ctx.account.user_id),
                vec![PriceItem::new(product.title.clone(), product.price)],
            )
            .with_photo_url(product.image_url.clone()),
        ])
    });

    vec![
        Action::command(r"^/start$", start),
        Action::command(r"^/product (\d+)$", show_product),
        Action::callback("product", open_product),
        Action::callback("catalog", back_to_list),
        Action::callback("buy", buy),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_dispatch::{ActionRegistry, Payload};
    use dbot_core::{Chat, Event, InboundMessage, ResponseKind, User};
    use std::sync::Arc;

    fn account() -> Arc<ShopAccount> {
        Arc::new(ShopAccount {
            user_id: 5,
            display_name: "Ann".to_string(),
            is_admin: false,
        })
    }

    fn message_event(text: &str) -> Arc<Event> {
        let user = User {
            id: 5,
            username: None,
            first_name: Some("Ann".to_string()),
            last_name: None,
        };
        let chat = Chat {
            id: 5,
            chat_type: "private".to_string(),
        };
        Arc::new(Event::Message(InboundMessage::text(1, user, chat, text)))
    }

    #[tokio::test]
    async fn test_product_command_uses_capture() {
        let registry =
            ActionRegistry::new().add_controller(&ShopServices::default(), catalog_controller);
        let (action, captures) = registry.match_command("/product 2").unwrap();

        let ctx = EventContext::new(
            account(),
            message_event("/product 2"),
            Payload::Command { captures },
        );
        let responses = action.handler().handle(ctx).await.unwrap();

        assert_eq!(responses.len(), 1);
        match &responses[0].kind {
            ResponseKind::Photo { caption, .. } => {
                assert!(caption.as_deref().unwrap_or_default().contains("Tea set"))
            }
            other => panic!("expected photo, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_buy_issues_invoice_in_major_units() {
        let registry =
            ActionRegistry::new().add_controller(&ShopServices::default(), catalog_controller);
        let action = registry.callback("buy").unwrap();
        let payload = Payload::Callback {
            data: "buy:3".to_string(),
            parts: vec!["buy".to_string(), "3".to_string()],
        };

        let responses = action
            .handler()
            .handle(EventContext::new(account(), message_event("x"), payload))
            .await
            .unwrap();

        match &responses[1].kind {
            ResponseKind::Invoice { payload, prices, .. } => {
                assert_eq!(payload, "order:3:5");
                assert_eq!(prices[0].price, 3150);
            }
            other => panic!("expected invoice, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_product_is_handler_error() {
        let registry =
            ActionRegistry::new().add_controller(&ShopServices::default(), catalog_controller);
        let (action, captures) = registry.match_command("/product 42").unwrap();

        let ctx = EventContext::new(
            account(),
            message_event("/product 42"),
            Payload::Command { captures },
        );

        assert!(action.handler().handle(ctx).await.is_err());
    }
}
