/// Which upstream field supplies the pre-discount unit price.
///
/// Older order-list captures only carry `order_price`; newer ones also
/// expose `price_before_discount`. Both stay supported so exports keep
/// working across payload revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NominalPriceSource {
    OrderPrice,
    PriceBeforeDiscount,
}

impl NominalPriceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            NominalPriceSource::OrderPrice => "order_price",
            NominalPriceSource::PriceBeforeDiscount => "price_before_discount",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "order_price" => Some(NominalPriceSource::OrderPrice),
            "price_before_discount" => Some(NominalPriceSource::PriceBeforeDiscount),
            _ => None,
        }
    }
}

/// How monetary cells are written into the CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    /// Rounded whole amount with thousands separators, wrapped in quotes
    /// (spreadsheet-friendly).
    QuotedThousands,
    /// Unquoted fixed two-decimal value.
    PlainDecimal,
}

impl NumberStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberStyle::QuotedThousands => "quoted_thousands",
            NumberStyle::PlainDecimal => "plain_decimal",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "quoted_thousands" => Some(NumberStyle::QuotedThousands),
            "plain_decimal" => Some(NumberStyle::PlainDecimal),
            _ => None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub page_size: u32,
    pub inter_page_delay_ms: u64,
    pub nominal_price_source: NominalPriceSource,
    pub number_style: NumberStyle,
    pub output_path: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let api_base = std::env::var("SHOPEE_API_BASE")
            .unwrap_or_else(|_| crate::client::DEFAULT_API_BASE.to_string());

        let page_size = std::env::var("PAGE_SIZE")
            .unwrap_or_else(|_| "20".to_string())
            .parse()
            .unwrap_or(20);

        let inter_page_delay_ms = std::env::var("INTER_PAGE_DELAY_MS")
            .unwrap_or_else(|_| "500".to_string())
            .parse()
            .unwrap_or(500);

        let nominal_price_source = std::env::var("NOMINAL_PRICE_SOURCE")
            .ok()
            .and_then(|v| NominalPriceSource::parse(&v))
            .unwrap_or(NominalPriceSource::OrderPrice);

        let number_style = std::env::var("NUMBER_STYLE")
            .ok()
            .and_then(|v| NumberStyle::parse(&v))
            .unwrap_or(NumberStyle::QuotedThousands);

        let output_path = std::env::var("OUTPUT_PATH").ok();

        Ok(Self {
            api_base,
            page_size,
            inter_page_delay_ms,
            nominal_price_source,
            number_style,
            output_path,
        })
    }
}
