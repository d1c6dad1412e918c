//! Fixed column positions of the portal's tables.
//!
//! The portal's markup carries no usable header ids, so cells are read by
//! index. A change in the portal's layout is a one-line change here.

/// Output columns, in order.
pub const TRANSACTION_COLUMNS: [&'static str; 8] = [
    "tx_date",
    "file_date",
    "last_name",
    "first_name",
    "order_type",
    "ticker",
    "asset_name",
    "tx_amount",
];

/// Tickers the portal uses for "no ticker".
pub const BLANK_TICKERS: [&'static str; 2] = ["", "--"];

/// Cell indices of a filing's transaction table.
#[derive(Clone, Copy, Debug)]
pub struct TransactionLayout {
    pub tx_date: usize,
    pub ticker: usize,
    pub asset_name: usize,
    pub asset_type: usize,
    pub order_type: usize,
    pub tx_amount: usize,
}

/// `# | Transaction Date | Owner | Ticker | Asset Name | Asset Type | Type | Amount | Comment`
pub const TRANSACTION_LAYOUT: TransactionLayout = TransactionLayout {
    tx_date: 1,
    ticker: 3,
    asset_name: 4,
    asset_type: 5,
    order_type: 6,
    tx_amount: 7,
};

impl TransactionLayout {
    /// Fewest cells a row needs for every field to be present.
    pub const fn width(&self) -> usize {
        let mut max = self.tx_date;
        let fields = [
            self.ticker,
            self.asset_name,
            self.asset_type,
            self.order_type,
            self.tx_amount,
        ];
        let mut i = 0;
        while i < fields.len() {
            if fields[i] > max {
                max = fields[i];
            }
            i += 1;
        }
        max + 1
    }
}

/// Cell indices of the search results table (browser variant).
#[derive(Clone, Copy, Debug)]
pub struct ResultsLayout {
    pub first_name: usize,
    pub last_name: usize,
    pub report_type: usize,
    pub link: usize,
    pub date_received: usize,
}

/// `First | Last | Office (Filer Type) | Report Type | Date Received`
pub const RESULTS_LAYOUT: ResultsLayout = ResultsLayout {
    first_name: 0,
    last_name: 1,
    report_type: 2,
    link: 3,
    date_received: 4,
};

impl ResultsLayout {
    pub const fn width(&self) -> usize {
        self.date_received + 1
    }
}
