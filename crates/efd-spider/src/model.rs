use crate::html::first_href;
use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

/// One filed report, as listed by the search index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub first_name: String,
    pub last_name: String,
    pub report_type: String,
    /// Path of the filing page, relative to the portal root; empty when the
    /// index row carried no link.
    pub detail_link: String,
    pub date_received: String,
}

/// A single disclosed trade.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub tx_date: String,
    pub file_date: String,
    pub last_name: String,
    pub first_name: String,
    pub order_type: String,
    pub ticker: String,
    pub asset_name: String,
    pub tx_amount: String,
}

// de
// ----------------------------------------------------------------------------
//
// each index row is a positional array of strings:
//
//  [
//      "Jane",
//      "Doe",
//      "Doe, Jane (Senator)",
//      "<a href=\"/search/view/ptr/8a7b.../\" target=\"_blank\">Periodic Transaction Report for 01/02/2020</a>",
//      "01/03/2020"
//  ]

struct ReportRowVisitor;

impl<'de> Visitor<'de> for ReportRowVisitor {
    type Value = ReportRow;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("an array of 5 strings")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut next = |index: usize| -> Result<String, A::Error> {
            seq.next_element::<String>()?
                .ok_or_else(|| de::Error::invalid_length(index, &self))
        };
        let first_name = next(0)?;
        let last_name = next(1)?;
        let report_type = next(2)?;
        let link_html = next(3)?;
        let date_received = next(4)?;

        // tolerate trailing columns
        while seq.next_element::<IgnoredAny>()?.is_some() {}

        Ok(ReportRow {
            first_name,
            last_name,
            report_type,
            detail_link: first_href(&link_html).unwrap_or_default(),
            date_received,
        })
    }
}

impl<'de> Deserialize<'de> for ReportRow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(ReportRowVisitor)
    }
}
