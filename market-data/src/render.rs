//! Text frames pushed to subscribed clients. The layouts (header
//! whitespace, `$price:qty` cells, trailing comma per trade) are part of the
//! wire contract and must not drift.

use std::fmt::Write;

use protocol::{BookLevels, Trade};

/// Render a depth snapshot: a fixed header, then one row per level pair up
/// to `depth`. Rows past the shorter side are not emitted.
pub fn snapshot_frame(levels: &BookLevels, depth: usize) -> String {
    let rows = depth.min(levels.bids.len()).min(levels.asks.len());

    let mut frame = String::from(" Bids    \t\t  Asks   \n");
    for row in 0..rows {
        let bid = &levels.bids[row];
        let ask = &levels.asks[row];

        let _ = writeln!(
            frame,
            "${}:{} \t\t ${}:{}",
            bid.price, bid.quantity, ask.price, ask.quantity
        );
    }

    frame
}

/// Render one matching pass's trades as a single frame, one segment per
/// trade with its trailing comma.
pub fn trade_frame(trades: &[Trade]) -> String {
    let mut frame = String::new();
    for trade in trades {
        let _ = write!(
            frame,
            "Bid: {} Price: {} Quantity: {} | Ask: {} Price: {} Quantity: {},",
            trade.bid.order_id,
            trade.bid.price,
            trade.bid.quantity,
            trade.ask.order_id,
            trade.ask.price,
            trade.ask.quantity
        );
    }

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{LevelInfo, TradeInfo};

    fn levels(bids: &[(i32, u32)], asks: &[(i32, u32)]) -> BookLevels {
        BookLevels {
            bids: bids
                .iter()
                .map(|&(price, quantity)| LevelInfo { price, quantity })
                .collect(),
            asks: asks
                .iter()
                .map(|&(price, quantity)| LevelInfo { price, quantity })
                .collect(),
        }
    }

    #[test]
    fn snapshot_frame_is_bit_exact() {
        let frame = snapshot_frame(&levels(&[(10, 5), (9, 2)], &[(11, 7), (12, 1)]), 5);

        assert_eq!(
            frame,
            " Bids    \t\t  Asks   \n$10:5 \t\t $11:7\n$9:2 \t\t $12:1\n"
        );
    }

    #[test]
    fn snapshot_rows_clamp_to_shorter_side_and_depth() {
        let book = levels(&[(10, 5), (9, 2), (8, 1)], &[(11, 7)]);

        // One ask level, so one row regardless of bid depth.
        assert_eq!(
            snapshot_frame(&book, 5),
            " Bids    \t\t  Asks   \n$10:5 \t\t $11:7\n"
        );

        // Depth 0 keeps only the header.
        assert_eq!(snapshot_frame(&book, 0), " Bids    \t\t  Asks   \n");
    }

    #[test]
    fn snapshot_of_empty_book_is_header_only() {
        assert_eq!(snapshot_frame(&levels(&[], &[]), 5), " Bids    \t\t  Asks   \n");
    }

    #[test]
    fn trade_frame_keeps_trailing_comma_per_trade() {
        let trades = [
            Trade {
                bid: TradeInfo {
                    order_id: 1,
                    price: 10,
                    quantity: 3,
                },
                ask: TradeInfo {
                    order_id: 2,
                    price: 10,
                    quantity: 3,
                },
            },
            Trade {
                bid: TradeInfo {
                    order_id: 4,
                    price: 11,
                    quantity: 1,
                },
                ask: TradeInfo {
                    order_id: 3,
                    price: 9,
                    quantity: 1,
                },
            },
        ];

        assert_eq!(
            trade_frame(&trades),
            "Bid: 1 Price: 10 Quantity: 3 | Ask: 2 Price: 10 Quantity: 3,\
             Bid: 4 Price: 11 Quantity: 1 | Ask: 3 Price: 9 Quantity: 1,"
        );
    }

    #[test]
    fn empty_trade_batch_renders_empty_frame() {
        assert_eq!(trade_frame(&[]), "");
    }
}
