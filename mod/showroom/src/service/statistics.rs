//! Aggregate statistics over sale and supply history.
//!
//! The design is a lookup table, not a computation engine: every entity
//! maps to a fixed slice of [`MetricSet`]s, each one SELECT of SQL
//! aggregate expressions over the related sale/supply rows. Entities
//! without definitions (sales, supplies) yield the bare record count.
//!
//! Aggregates over an empty relation come back NULL and surface as
//! `None` — zero related sales is a result, never an error.

use std::collections::BTreeMap;

use serde::Serialize;

use dealerdesk_core::ServiceError;
use dealerdesk_sql::Value;

use crate::model::{Section, Showroom};
use crate::service::ShowroomService;

/// One named aggregate: SQL expression, stable key, display label.
pub struct Metric {
    pub key: &'static str,
    pub label: &'static str,
    pub expr: &'static str,
}

/// One aggregate query: a FROM/JOIN fragment, a filter per scope (each
/// binding `?1` to the object id or the showroom/owner id), and the
/// metrics it computes. Metrics are grouped by the joins they need so a
/// join required by one metric cannot multiply rows under another.
pub struct MetricSet {
    pub from: &'static str,
    pub object_filter: &'static str,
    pub list_filter: &'static str,
    pub metrics: &'static [Metric],
}

/// Computed statistics: entity count plus metric values. `None` means
/// no related records.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub count: i64,
    pub metrics: BTreeMap<String, Option<f64>>,
}

// ── Shared metric slices ────────────────────────────────────────────

/// Sale aggregates seen from a sale-owning entity (showroom, employee).
const SALE_METRICS: &[Metric] = &[
    Metric { key: "sales_count", label: "Number of sales", expr: "COUNT(DISTINCT s.id)" },
    Metric { key: "sales_products_count", label: "Number of items sold", expr: "COUNT(si.id)" },
    Metric { key: "sales_products_price_avg", label: "Average sale price", expr: "AVG(si.sale_price)" },
    Metric { key: "sales_products_price_sum", label: "Total sale value", expr: "SUM(si.sale_price)" },
    Metric { key: "sales_products_price_min", label: "Lowest sale price", expr: "MIN(si.sale_price)" },
    Metric { key: "sales_products_price_max", label: "Highest sale price", expr: "MAX(si.sale_price)" },
    Metric { key: "sales_products_quantity_avg", label: "Average units per item", expr: "AVG(si.quantity)" },
    Metric { key: "sales_products_quantity_sum", label: "Total units sold", expr: "SUM(si.quantity)" },
    Metric { key: "sales_products_quantity_min", label: "Fewest units per item", expr: "MIN(si.quantity)" },
    Metric { key: "sales_products_quantity_max", label: "Most units per item", expr: "MAX(si.quantity)" },
];

/// Profit per sold item is (sale price − supply price) × quantity,
/// joined through the product's supply history.
const SALE_PROFIT_METRICS: &[Metric] = &[
    Metric { key: "sales_profit_avg", label: "Average profit per item", expr: "AVG((si.sale_price - pi.supply_price) * si.quantity)" },
    Metric { key: "sales_profit_sum", label: "Total profit", expr: "SUM((si.sale_price - pi.supply_price) * si.quantity)" },
    Metric { key: "sales_profit_min", label: "Lowest profit per item", expr: "MIN((si.sale_price - pi.supply_price) * si.quantity)" },
    Metric { key: "sales_profit_max", label: "Highest profit per item", expr: "MAX((si.sale_price - pi.supply_price) * si.quantity)" },
];

/// Sale aggregates seen from the product side (product, category).
const PRODUCT_SALE_METRICS: &[Metric] = &[
    Metric { key: "sales_count", label: "Number of items sold", expr: "COUNT(si.id)" },
    Metric { key: "sales_price_avg", label: "Average order price", expr: "AVG(si.sale_price)" },
    Metric { key: "sales_price_sum", label: "Total order value", expr: "SUM(si.sale_price)" },
    Metric { key: "sales_price_min", label: "Lowest order price", expr: "MIN(si.sale_price)" },
    Metric { key: "sales_price_max", label: "Highest order price", expr: "MAX(si.sale_price)" },
    Metric { key: "sales_quantity_avg", label: "Average units per order", expr: "AVG(si.quantity)" },
    Metric { key: "sales_quantity_sum", label: "Total units ordered", expr: "SUM(si.quantity)" },
    Metric { key: "sales_quantity_min", label: "Fewest units per order", expr: "MIN(si.quantity)" },
    Metric { key: "sales_quantity_max", label: "Most units per order", expr: "MAX(si.quantity)" },
];

// ── Per-entity metric sets ──────────────────────────────────────────

const SHOWROOM_SETS: &[MetricSet] = &[
    MetricSet {
        from: "sale_items si JOIN sales s ON si.sale_id = s.id",
        object_filter: "s.showroom_id = ?1",
        list_filter: "s.showroom_id IN (SELECT id FROM showrooms WHERE owner_id = ?1)",
        metrics: SALE_METRICS,
    },
    MetricSet {
        from: "sale_items si JOIN sales s ON si.sale_id = s.id \
               JOIN supply_items pi ON pi.product_id = si.product_id",
        object_filter: "s.showroom_id = ?1",
        list_filter: "s.showroom_id IN (SELECT id FROM showrooms WHERE owner_id = ?1)",
        metrics: SALE_PROFIT_METRICS,
    },
];

const EMPLOYEE_SETS: &[MetricSet] = &[
    MetricSet {
        from: "sale_items si JOIN sales s ON si.sale_id = s.id",
        object_filter: "s.employee_id = ?1",
        list_filter: "s.employee_id IN (SELECT id FROM employees WHERE showroom_id = ?1)",
        metrics: SALE_METRICS,
    },
    MetricSet {
        from: "sale_items si JOIN sales s ON si.sale_id = s.id \
               JOIN supply_items pi ON pi.product_id = si.product_id",
        object_filter: "s.employee_id = ?1",
        list_filter: "s.employee_id IN (SELECT id FROM employees WHERE showroom_id = ?1)",
        metrics: SALE_PROFIT_METRICS,
    },
];

const PRODUCT_SETS: &[MetricSet] = &[
    MetricSet {
        from: "sale_items si",
        object_filter: "si.product_id = ?1",
        list_filter: "si.product_id IN (SELECT id FROM products WHERE showroom_id = ?1)",
        metrics: PRODUCT_SALE_METRICS,
    },
    MetricSet {
        from: "sale_items si JOIN supply_items pi ON pi.product_id = si.product_id",
        object_filter: "si.product_id = ?1",
        list_filter: "si.product_id IN (SELECT id FROM products WHERE showroom_id = ?1)",
        metrics: SALE_PROFIT_METRICS,
    },
];

const CATEGORY_SETS: &[MetricSet] = &[
    MetricSet {
        from: "products p",
        object_filter: "p.category_id = ?1",
        list_filter: "p.showroom_id = ?1",
        metrics: &[Metric {
            key: "products_count",
            label: "Number of products",
            expr: "COUNT(p.id)",
        }],
    },
    MetricSet {
        from: "sale_items si JOIN products p ON si.product_id = p.id",
        object_filter: "p.category_id = ?1",
        list_filter: "p.showroom_id = ?1",
        metrics: PRODUCT_SALE_METRICS,
    },
    MetricSet {
        from: "sale_items si JOIN products p ON si.product_id = p.id \
               JOIN supply_items pi ON pi.product_id = p.id",
        object_filter: "p.category_id = ?1",
        list_filter: "p.showroom_id = ?1",
        metrics: SALE_PROFIT_METRICS,
    },
];

const DEALER_SETS: &[MetricSet] = &[
    MetricSet {
        from: "supply_items pi JOIN supplies sp ON pi.supply_id = sp.id",
        object_filter: "sp.dealer_id = ?1",
        list_filter: "sp.showroom_id = ?1",
        metrics: &[
            Metric { key: "supply_count", label: "Number of supplies", expr: "COUNT(DISTINCT sp.id)" },
            Metric { key: "supply_product_count", label: "Number of items supplied", expr: "COUNT(pi.id)" },
        ],
    },
    MetricSet {
        from: "sale_items si \
               JOIN supply_items pi ON pi.product_id = si.product_id \
               JOIN supplies sp ON pi.supply_id = sp.id",
        object_filter: "sp.dealer_id = ?1",
        list_filter: "sp.showroom_id = ?1",
        metrics: &[
            Metric { key: "supply_sales_count", label: "Items sold from supplies", expr: "COUNT(si.id)" },
            Metric { key: "supply_sales_price_avg", label: "Average sale price", expr: "AVG(si.sale_price)" },
            Metric { key: "supply_sales_price_sum", label: "Total sale value", expr: "SUM(si.sale_price)" },
            Metric { key: "supply_sales_price_min", label: "Lowest sale price", expr: "MIN(si.sale_price)" },
            Metric { key: "supply_sales_price_max", label: "Highest sale price", expr: "MAX(si.sale_price)" },
            Metric { key: "supply_sales_quantity_avg", label: "Average units per order", expr: "AVG(si.quantity)" },
            Metric { key: "supply_sales_quantity_sum", label: "Total units ordered", expr: "SUM(si.quantity)" },
            Metric { key: "supply_sales_quantity_min", label: "Fewest units per order", expr: "MIN(si.quantity)" },
            Metric { key: "supply_sales_quantity_max", label: "Most units per order", expr: "MAX(si.quantity)" },
            Metric { key: "supply_sales_profit_avg", label: "Average profit per item", expr: "AVG((si.sale_price - pi.supply_price) * si.quantity)" },
            Metric { key: "supply_sales_profit_sum", label: "Total profit", expr: "SUM((si.sale_price - pi.supply_price) * si.quantity)" },
            Metric { key: "supply_sales_profit_min", label: "Lowest profit per item", expr: "MIN((si.sale_price - pi.supply_price) * si.quantity)" },
            Metric { key: "supply_sales_profit_max", label: "Highest profit per item", expr: "MAX((si.sale_price - pi.supply_price) * si.quantity)" },
        ],
    },
];

/// Metric sets for a section. Sales and supplies have none — their
/// statistics are the bare record count.
fn section_metric_sets(section: Section) -> &'static [MetricSet] {
    match section {
        Section::Employees => EMPLOYEE_SETS,
        Section::Products => PRODUCT_SETS,
        Section::Categories => CATEGORY_SETS,
        Section::Dealers => DEALER_SETS,
        Section::Sales | Section::Supplies => &[],
    }
}

impl ShowroomService {
    /// Statistics for one showroom.
    pub fn showroom_statistics(
        &self,
        showroom: &Showroom,
        verbose: bool,
    ) -> Result<Statistics, ServiceError> {
        self.collect_statistics("showrooms", "id = ?1", &showroom.id, SHOWROOM_SETS, true, &showroom.id, verbose)
    }

    /// Statistics across every showroom a user owns.
    pub fn owner_statistics(&self, owner_id: &str, verbose: bool) -> Result<Statistics, ServiceError> {
        self.collect_statistics(
            "showrooms",
            "owner_id = ?1",
            owner_id,
            SHOWROOM_SETS,
            false,
            owner_id,
            verbose,
        )
    }

    /// Statistics for a section — one object (by slug) or the whole
    /// section of the showroom.
    pub fn section_statistics(
        &self,
        showroom: &Showroom,
        section: Section,
        object_slug: Option<&str>,
        verbose: bool,
    ) -> Result<Statistics, ServiceError> {
        let sets = section_metric_sets(section);
        match object_slug {
            Some(slug) => {
                let object_id = self.section_record_id(showroom, section, slug)?;
                self.collect_statistics(section.table(), "id = ?1", &object_id, sets, true, &object_id, verbose)
            }
            None => self.collect_statistics(
                section.table(),
                "showroom_id = ?1",
                &showroom.id,
                sets,
                false,
                &showroom.id,
                verbose,
            ),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_statistics(
        &self,
        count_table: &str,
        count_filter: &str,
        count_param: &str,
        sets: &'static [MetricSet],
        object_scope: bool,
        param: &str,
        verbose: bool,
    ) -> Result<Statistics, ServiceError> {
        let count_sql = format!(
            "SELECT COUNT(*) AS cnt FROM {} WHERE {}",
            count_table, count_filter
        );
        let count_rows = self.sql
            .query(&count_sql, &[Value::Text(count_param.to_string())])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let count = count_rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0);

        let mut metrics = BTreeMap::new();
        for set in sets {
            let filter = if object_scope {
                set.object_filter
            } else {
                set.list_filter
            };
            let select: Vec<String> = set
                .metrics
                .iter()
                .map(|m| format!("{} AS {}", m.expr, m.key))
                .collect();
            let sql = format!("SELECT {} FROM {} WHERE {}", select.join(", "), set.from, filter);

            let rows = self.sql
                .query(&sql, &[Value::Text(param.to_string())])
                .map_err(|e| ServiceError::Storage(e.to_string()))?;

            if let Some(row) = rows.first() {
                for metric in set.metrics {
                    let name = if verbose { metric.label } else { metric.key };
                    metrics.insert(name.to_string(), row.get_num(metric.key));
                }
            }
        }

        Ok(Statistics { count, metrics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CreateCategory, CreateDealer, CreateEmployee, CreateProduct, CreateSupply,
        CreateSupplyItem, SellRequest, Showroom,
    };
    use crate::service::test_support::{test_service, test_showroom};

    /// One showroom with a supplied and partly sold product.
    ///
    /// Supply: 10 units at 25 000. Sale: 2 units at 30 000, credited to
    /// an employee. Expected profit per sold item: (30 000 − 25 000) × 2.
    fn seed(svc: &ShowroomService) -> Showroom {
        let showroom = test_showroom(svc, "owner-1");
        let employee = svc
            .create_employee(
                &showroom,
                CreateEmployee {
                    first_name: "Ivan".into(),
                    last_name: "Petrov".into(),
                    patronymic: String::new(),
                    phone_number: "+7 900 000 00 00".into(),
                },
            )
            .unwrap();
        let dealer = svc
            .create_dealer(
                &showroom,
                CreateDealer {
                    name: "AutoTrade".into(),
                    is_active: true,
                },
            )
            .unwrap();
        let category = svc
            .create_category(&showroom, CreateCategory { name: "Sedans".into() })
            .unwrap();
        let product = svc
            .create_product(
                &showroom,
                CreateProduct {
                    title: "Model 3".into(),
                    price: 30_000,
                    quantity: 5,
                    category_slug: category.slug,
                },
            )
            .unwrap();

        let supply = svc
            .create_supply(
                &showroom,
                CreateSupply {
                    dealer_slug: dealer.slug,
                },
            )
            .unwrap();
        svc.add_supply_item(
            &showroom,
            &supply.slug,
            CreateSupplyItem {
                product_slug: product.slug.clone(),
                quantity: 10,
                supply_price: 25_000,
            },
        )
        .unwrap();

        svc.sell_product(
            &showroom,
            &product.slug,
            SellRequest {
                quantity: 2,
                employee_slug: Some(employee.slug),
                sale_slug: None,
            },
        )
        .unwrap();

        showroom
    }

    #[test]
    fn showroom_statistics_aggregate_sales_and_profit() {
        let svc = test_service();
        let showroom = seed(&svc);

        let stats = svc.showroom_statistics(&showroom, false).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.metrics["sales_count"], Some(1.0));
        assert_eq!(stats.metrics["sales_products_count"], Some(1.0));
        assert_eq!(stats.metrics["sales_products_price_sum"], Some(30_000.0));
        assert_eq!(stats.metrics["sales_products_quantity_sum"], Some(2.0));
        // (30 000 − 25 000) × 2
        assert_eq!(stats.metrics["sales_profit_sum"], Some(10_000.0));
    }

    #[test]
    fn zero_sales_yield_none_not_errors() {
        let svc = test_service();
        let showroom = test_showroom(&svc, "owner-1");

        let stats = svc.showroom_statistics(&showroom, false).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.metrics["sales_count"], Some(0.0));
        assert_eq!(stats.metrics["sales_products_price_avg"], None);
        assert_eq!(stats.metrics["sales_products_price_sum"], None);
        assert_eq!(stats.metrics["sales_profit_sum"], None);
    }

    #[test]
    fn employee_statistics_follow_credited_sales() {
        let svc = test_service();
        let showroom = seed(&svc);

        let stats = svc
            .section_statistics(&showroom, Section::Employees, None, false)
            .unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.metrics["sales_count"], Some(1.0));
        assert_eq!(stats.metrics["sales_products_quantity_sum"], Some(2.0));
    }

    #[test]
    fn dealer_statistics_cover_supplies_and_their_sales() {
        let svc = test_service();
        let showroom = seed(&svc);

        let stats = svc
            .section_statistics(&showroom, Section::Dealers, None, false)
            .unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.metrics["supply_count"], Some(1.0));
        assert_eq!(stats.metrics["supply_product_count"], Some(1.0));
        assert_eq!(stats.metrics["supply_sales_count"], Some(1.0));
        assert_eq!(stats.metrics["supply_sales_profit_sum"], Some(10_000.0));
    }

    #[test]
    fn category_statistics_include_product_count() {
        let svc = test_service();
        let showroom = seed(&svc);

        let stats = svc
            .section_statistics(&showroom, Section::Categories, None, false)
            .unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.metrics["products_count"], Some(1.0));
        assert_eq!(stats.metrics["sales_quantity_sum"], Some(2.0));
    }

    #[test]
    fn sections_without_definitions_yield_bare_count() {
        let svc = test_service();
        let showroom = seed(&svc);

        let stats = svc
            .section_statistics(&showroom, Section::Sales, None, false)
            .unwrap();
        assert_eq!(stats.count, 1);
        assert!(stats.metrics.is_empty());
    }

    #[test]
    fn verbose_swaps_keys_for_labels() {
        let svc = test_service();
        let showroom = seed(&svc);

        let stats = svc.showroom_statistics(&showroom, true).unwrap();
        assert!(stats.metrics.contains_key("Number of sales"));
        assert!(!stats.metrics.contains_key("sales_count"));
    }

    #[test]
    fn object_scope_differs_from_list_scope() {
        let svc = test_service();
        let showroom = seed(&svc);

        // A second product that never sold.
        let category = svc
            .create_category(&showroom, CreateCategory { name: "Vans".into() })
            .unwrap();
        let idle = svc
            .create_product(
                &showroom,
                CreateProduct {
                    title: "Transporter".into(),
                    price: 45_000,
                    quantity: 1,
                    category_slug: category.slug,
                },
            )
            .unwrap();

        let all = svc
            .section_statistics(&showroom, Section::Products, None, false)
            .unwrap();
        assert_eq!(all.count, 2);
        assert_eq!(all.metrics["sales_count"], Some(1.0));

        let idle_stats = svc
            .section_statistics(&showroom, Section::Products, Some(&idle.slug), false)
            .unwrap();
        assert_eq!(idle_stats.count, 1);
        assert_eq!(idle_stats.metrics["sales_count"], Some(0.0));
        assert_eq!(idle_stats.metrics["sales_price_sum"], None);
    }
}
