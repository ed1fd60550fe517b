//! Human-readable order text: the Bulgarian plaintext summary used for the
//! operator emails and the customer confirmation, plus the messaging
//! deep links for manual forwarding.

use bigdecimal::BigDecimal;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use super::order::{DeliveryMethod, DistributorInquiry, OrderRequest, PaymentMethod, Unit};

/// Business number orders get forwarded to over WhatsApp.
pub const FORWARD_PHONE: &str = "359877604203";

/// Quality-tier annotations keyed on fixed catalog price points.
const QUALITY_TIERS: &[(&str, &str)] = &[
    ("5.60", "премиум качество"),
    ("4.50", "първо качество"),
];

pub fn delivery_label(method: DeliveryMethod) -> &'static str {
    match method {
        DeliveryMethod::CourierCod => "Доставка с куриер (наложен платеж)",
        DeliveryMethod::OwnTransport => "Собствен транспорт",
        DeliveryMethod::Pickup => "Лично вземане от стопанството",
    }
}

pub fn payment_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::CashOnDelivery => "Наложен платеж",
        PaymentMethod::Card => "Карта",
    }
}

pub fn unit_label(unit: Unit) -> &'static str {
    match unit {
        Unit::Kg => "кг",
        Unit::Bunch => "връзка",
        Unit::Piece => "бр.",
        Unit::Jar => "буркан",
        Unit::Litre => "л",
    }
}

/// Tier annotation for a unit price, when the price matches a known tier.
pub fn quality_tier(price_per_unit: &BigDecimal) -> Option<&'static str> {
    QUALITY_TIERS
        .iter()
        .find(|(price, _)| {
            price
                .parse::<BigDecimal>()
                .map(|p| p == *price_per_unit)
                .unwrap_or(false)
        })
        .map(|(_, label)| *label)
}

fn lv(amount: &BigDecimal) -> String {
    format!("{} лв", amount.with_scale_round(2, bigdecimal::RoundingMode::HalfUp))
}

/// Render the full plaintext summary of an accepted order.
pub fn render_order_text(order_id: &str, order: &OrderRequest) -> String {
    let mut text = String::new();

    text.push_str(&format!("Нова поръчка: {order_id}\n"));
    text.push_str(&format!("Дата: {}\n\n", order.created_at.to_rfc3339()));

    text.push_str(&format!("Клиент: {}\n", order.customer.name));
    text.push_str(&format!("Телефон: {}\n", order.customer.phone));
    if let Some(email) = &order.customer.email {
        text.push_str(&format!("Имейл: {email}\n"));
    }
    text.push('\n');

    text.push_str("Продукти:\n");
    for item in &order.items {
        let name = match &item.variety {
            Some(variety) => format!("{} ({})", item.name, variety),
            None => item.name.clone(),
        };
        let mut line = format!(
            "  • {} — {} {} × {} = {}",
            name,
            item.qty,
            unit_label(item.unit),
            lv(&item.price_per_unit),
            lv(&item.line_total),
        );
        if let Some(tier) = quality_tier(&item.price_per_unit) {
            line.push_str(&format!(" [{tier}]"));
        }
        text.push_str(&line);
        text.push('\n');
    }
    text.push('\n');

    text.push_str(&format!("Междинна сума: {}\n", lv(&order.subtotal)));
    if let Some(discount) = &order.discount {
        if *discount != BigDecimal::from(0) {
            text.push_str(&format!("Отстъпка: -{}\n", lv(discount)));
        }
    }
    text.push_str(&format!("Доставка: {}\n", lv(&order.delivery.fee)));
    text.push_str(&format!("Общо: {}\n\n", lv(&order.total)));

    text.push_str(&format!(
        "Начин на доставка: {}\n",
        delivery_label(order.delivery.method)
    ));
    if let Some(address) = &order.delivery.address {
        let mut parts = vec![address.street.clone(), address.city.clone(), address.postcode.clone()];
        if let Some(extra) = &address.extra {
            parts.push(extra.clone());
        }
        text.push_str(&format!("Адрес: {}\n", parts.join(", ")));
    }
    if let Some(preferred) = &order.delivery.preferred {
        match (&preferred.date, &preferred.slot) {
            (Some(date), Some(slot)) => {
                text.push_str(&format!("Предпочитано време: {date}, {slot}\n"));
            }
            (Some(date), None) => text.push_str(&format!("Предпочитано време: {date}\n")),
            (None, Some(slot)) => text.push_str(&format!("Предпочитано време: {slot}\n")),
            (None, None) => {}
        }
    }
    text.push_str(&format!(
        "Плащане: {}\n",
        payment_label(order.payment.method)
    ));
    if let Some(notes) = &order.notes {
        if !notes.trim().is_empty() {
            text.push_str(&format!("Бележки: {notes}\n"));
        }
    }

    text
}

/// Render the plaintext body of a distributor-inquiry notification.
pub fn render_inquiry_text(inquiry_id: &str, inquiry: &DistributorInquiry) -> String {
    let mut text = String::new();
    text.push_str(&format!("Ново запитване за дистрибуция: {inquiry_id}\n\n"));
    text.push_str(&format!("Фирма: {}\n", inquiry.company));
    text.push_str(&format!("Телефон: {}\n", inquiry.phone));
    if let Some(region) = &inquiry.region {
        text.push_str(&format!("Регион: {region}\n"));
    }
    if let Some(message) = &inquiry.message {
        if !message.trim().is_empty() {
            text.push_str(&format!("Съобщение: {message}\n"));
        }
    }
    text
}

/// Viber forward deep link carrying the summary text.
pub fn viber_link(text: &str) -> String {
    format!(
        "viber://forward?text={}",
        utf8_percent_encode(text, NON_ALPHANUMERIC)
    )
}

/// WhatsApp deep link to `phone` pre-filled with the summary text.
pub fn whatsapp_link(phone: &str, text: &str) -> String {
    format!(
        "https://wa.me/{phone}?text={}",
        utf8_percent_encode(text, NON_ALPHANUMERIC)
    )
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::order::{
        Address, Customer, Delivery, OrderItem, Payment, Preferred, CURRENCY,
    };

    fn dec(s: &str) -> BigDecimal {
        s.parse().expect("valid decimal")
    }

    fn sample_order() -> OrderRequest {
        OrderRequest {
            idempotency_key: Some("order_1755000000000_ab12cd".into()),
            locale: "bg".into(),
            currency: CURRENCY.into(),
            customer: Customer {
                name: "Иван Петров".into(),
                phone: "+359888123456".into(),
                email: Some("ivan@example.com".into()),
            },
            delivery: Delivery {
                method: DeliveryMethod::CourierCod,
                address: Some(Address {
                    street: "ул. Шипка 3".into(),
                    city: "София".into(),
                    postcode: "1000".into(),
                    extra: None,
                }),
                preferred: Some(Preferred {
                    date: Some("2025-08-14".into()),
                    slot: Some("9:00 – 12:00".into()),
                }),
                fee: dec("4.90"),
            },
            payment: Payment {
                method: PaymentMethod::CashOnDelivery,
            },
            items: vec![OrderItem {
                product_id: "tomatoes".into(),
                name: "Домати".into(),
                variety: Some("розови".into()),
                qty: dec("2"),
                unit: Unit::Kg,
                price_per_unit: dec("5.60"),
                line_total: dec("11.20"),
            }],
            subtotal: dec("11.20"),
            discount: None,
            total: dec("16.10"),
            notes: Some("втори вход откъм двора".into()),
            created_at: Utc.with_ymd_and_hms(2025, 8, 12, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn summary_lists_items_with_totals() {
        let text = render_order_text("OR-2025-1755000000123", &sample_order());

        assert!(text.contains("Нова поръчка: OR-2025-1755000000123"));
        assert!(text.contains("Домати (розови) — 2 кг × 5.60 лв = 11.20 лв"));
        assert!(text.contains("Междинна сума: 11.20 лв"));
        assert!(text.contains("Доставка: 4.90 лв"));
        assert!(text.contains("Общо: 16.10 лв"));
        assert!(text.contains("Доставка с куриер (наложен платеж)"));
        assert!(text.contains("Адрес: ул. Шипка 3, София, 1000"));
    }

    #[test]
    fn premium_price_point_is_annotated() {
        let text = render_order_text("OR-2025-1", &sample_order());
        assert!(text.contains("[премиум качество]"));
    }

    #[test]
    fn unknown_price_point_has_no_annotation() {
        assert_eq!(quality_tier(&dec("2.80")), None);
        assert_eq!(quality_tier(&dec("5.60")), Some("премиум качество"));
        assert_eq!(quality_tier(&dec("5.6")), Some("премиум качество"));
    }

    #[test]
    fn discount_line_only_when_nonzero() {
        let mut order = sample_order();
        let without = render_order_text("OR-2025-1", &order);
        assert!(!without.contains("Отстъпка"));

        order.discount = Some(dec("0.56"));
        let with = render_order_text("OR-2025-1", &order);
        assert!(with.contains("Отстъпка: -0.56 лв"));
    }

    #[test]
    fn deep_links_are_percent_encoded() {
        let viber = viber_link("Поръчка OR-2025-1");
        assert!(viber.starts_with("viber://forward?text="));
        assert!(!viber.contains(' '));

        let wa = whatsapp_link(FORWARD_PHONE, "Поръчка OR-2025-1");
        assert!(wa.starts_with(&format!("https://wa.me/{FORWARD_PHONE}?text=")));
        assert!(!wa.contains(' '));
    }

    #[test]
    fn inquiry_text_includes_contact_block() {
        let inquiry = DistributorInquiry {
            company: "Зеленчук ООД".into(),
            phone: "+359888111222".into(),
            region: Some("Пловдив".into()),
            message: None,
        };
        let text = render_inquiry_text("DIST-2025-1755000000421", &inquiry);

        assert!(text.contains("DIST-2025-1755000000421"));
        assert!(text.contains("Фирма: Зеленчук ООД"));
        assert!(text.contains("Регион: Пловдив"));
    }
}
