//! Conversions from decoded contract events to normalized trades.
//!
//! Bonding-curve events map directly: the event name fixes the direction,
//! and amounts are already whole tokens. Pool swaps are classified from the
//! signed balance deltas under the orientation the pool resolver
//! establishes (token0 = agent token, token1 = wrapped native). A swap
//! whose signs do not form a buy or a sell — and any event whose amounts
//! cannot be scaled — produces no trade at all.

use ethers::types::{Address, I256, U256};
use rust_decimal::Decimal;
use tracing::debug;

use crate::chain::abi::bonding_curve::BondingCurveEvents;
use crate::chain::abi::uniswap_v3_pool::SwapFilter;
use crate::domain::trade::{EventMeta, Trade};
use crate::shared::scaling::{
    scale_raw_amount, scale_signed_magnitude, unit_price, wei_to_eth, NATIVE_DECIMALS,
};
use crate::shared::TradeKind;

/// Normalize a bonding-curve Buy/Sell event.
pub fn trade_from_curve_event(
    event: &BondingCurveEvents,
    meta: EventMeta,
    time: u64,
) -> Option<Trade> {
    let (kind, account, amount, value) = match event {
        BondingCurveEvents::BuyFilter(buy) => {
            (TradeKind::Buy, buy.account, buy.amount, buy.cost)
        }
        BondingCurveEvents::SellFilter(sell) => {
            (TradeKind::Sell, sell.account, sell.amount, sell.refund)
        }
    };

    // Curve amounts are denominated in whole tokens; only the value is wei.
    build_trade(kind, account, scale_curve_amount(amount)?, wei_value(value)?, meta, time)
}

/// Classify and normalize a pool Swap event.
///
/// Sign pattern, from the pool's perspective with token0 = agent token:
/// token0 out + token1 in is a buy, token0 in + token1 out is a sell.
/// Anything else (same-sign deltas, zero legs) is a swap shape this system
/// does not model and is discarded.
pub fn trade_from_swap(
    swap: &SwapFilter,
    meta: EventMeta,
    time: u64,
    token_decimals: u8,
) -> Option<Trade> {
    let zero = I256::zero();

    let kind = if swap.amount_0 < zero && swap.amount_1 > zero {
        TradeKind::Buy
    } else if swap.amount_0 > zero && swap.amount_1 < zero {
        TradeKind::Sell
    } else {
        debug!(
            block = meta.block_number,
            log = meta.log_index,
            "discarding unclassifiable swap"
        );
        return None;
    };

    let quantity = scale_or_skip(scale_signed_magnitude(swap.amount_0, token_decimals), meta)?;
    let value = scale_or_skip(
        scale_signed_magnitude(swap.amount_1, NATIVE_DECIMALS),
        meta,
    )?;

    build_trade(kind, swap.recipient, quantity, value, meta, time)
}

fn build_trade(
    kind: TradeKind,
    account: Address,
    quantity: Decimal,
    value: Decimal,
    meta: EventMeta,
    time: u64,
) -> Option<Trade> {
    let price = match unit_price(value, quantity) {
        Ok(price) => price,
        Err(e) => {
            // Zero-quantity fills land here: priced at nothing meaningful,
            // they are dropped rather than floored to the full value moved.
            debug!(
                %e,
                block = meta.block_number,
                log = meta.log_index,
                "discarding unpriceable trade"
            );
            return None;
        }
    };

    Some(Trade {
        time,
        kind,
        account,
        quantity,
        unit_price: price,
        block_number: meta.block_number,
        log_index: meta.log_index,
    })
}

fn scale_curve_amount(amount: U256) -> Option<Decimal> {
    scale_raw_amount(amount, 0).ok()
}

fn wei_value(value: U256) -> Option<Decimal> {
    wei_to_eth(value).ok()
}

fn scale_or_skip(
    result: Result<Decimal, crate::shared::ScalingError>,
    meta: EventMeta,
) -> Option<Decimal> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(
                %e,
                block = meta.block_number,
                log = meta.log_index,
                "discarding unscalable swap amount"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::abi::bonding_curve::{BuyFilter, SellFilter};
    use rust_decimal::prelude::FromStr;

    fn meta() -> EventMeta {
        EventMeta {
            block_number: 100,
            log_index: 2,
        }
    }

    fn account() -> Address {
        "0x00000000000000000000000000000000000000aa".parse().unwrap()
    }

    fn eth(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    fn swap(amount_0: I256, amount_1: I256) -> SwapFilter {
        SwapFilter {
            sender: Address::zero(),
            recipient: account(),
            amount_0,
            amount_1,
            sqrt_price_x96: U256::zero(),
            liquidity: 0,
            tick: 0,
        }
    }

    fn signed_eth(n: i64) -> I256 {
        I256::from(n) * I256::exp10(18)
    }

    #[test]
    fn test_curve_buy_normalization() {
        // 500 tokens for 1 ETH => 0.002 ETH each
        let event = BondingCurveEvents::BuyFilter(BuyFilter {
            account: account(),
            amount: U256::from(500u64),
            cost: eth(1),
        });

        let trade = trade_from_curve_event(&event, meta(), 1_700_000_000).unwrap();
        assert_eq!(trade.kind, TradeKind::Buy);
        assert_eq!(trade.account, account());
        assert_eq!(trade.quantity, Decimal::from(500));
        assert_eq!(trade.unit_price, Decimal::from_str("0.002").unwrap());
        assert_eq!(trade.time, 1_700_000_000);
        assert_eq!(trade.block_number, 100);
    }

    #[test]
    fn test_curve_sell_normalization() {
        let event = BondingCurveEvents::SellFilter(SellFilter {
            account: account(),
            amount: U256::from(200u64),
            refund: eth(1),
        });

        let trade = trade_from_curve_event(&event, meta(), 1_700_000_000).unwrap();
        assert_eq!(trade.kind, TradeKind::Sell);
        assert_eq!(trade.unit_price, Decimal::from_str("0.005").unwrap());
    }

    #[test]
    fn test_curve_zero_amount_discarded() {
        let event = BondingCurveEvents::BuyFilter(BuyFilter {
            account: account(),
            amount: U256::zero(),
            cost: eth(1),
        });
        assert!(trade_from_curve_event(&event, meta(), 0).is_none());
    }

    #[test]
    fn test_swap_negative_token0_is_buy() {
        // Pool gave out 100 agent tokens and took in 50 native.
        let trade = trade_from_swap(&swap(signed_eth(-100), signed_eth(50)), meta(), 10, 18).unwrap();
        assert_eq!(trade.kind, TradeKind::Buy);
        assert_eq!(trade.quantity, Decimal::from(100));
        assert_eq!(trade.unit_price, Decimal::from_str("0.5").unwrap());
        assert_eq!(trade.account, account());
    }

    #[test]
    fn test_swap_positive_token0_is_sell() {
        let trade = trade_from_swap(&swap(signed_eth(30), signed_eth(-30)), meta(), 10, 18).unwrap();
        assert_eq!(trade.kind, TradeKind::Sell);
        assert_eq!(trade.quantity, Decimal::from(30));
        assert_eq!(trade.unit_price, Decimal::from(1));
    }

    #[test]
    fn test_swap_same_sign_discarded() {
        assert!(trade_from_swap(&swap(signed_eth(10), signed_eth(10)), meta(), 10, 18).is_none());
        assert!(trade_from_swap(&swap(signed_eth(-10), signed_eth(-10)), meta(), 10, 18).is_none());
    }

    #[test]
    fn test_swap_zero_leg_discarded() {
        assert!(trade_from_swap(&swap(I256::zero(), signed_eth(10)), meta(), 10, 18).is_none());
        assert!(trade_from_swap(&swap(signed_eth(-10), I256::zero()), meta(), 10, 18).is_none());
    }

    #[test]
    fn test_swap_respects_token_decimals() {
        // 6-decimal agent token: raw 100_000_000 = 100 tokens.
        let trade = trade_from_swap(
            &swap(I256::from(-100_000_000i64), signed_eth(50)),
            meta(),
            10,
            6,
        )
        .unwrap();
        assert_eq!(trade.quantity, Decimal::from(100));
        assert_eq!(trade.unit_price, Decimal::from_str("0.5").unwrap());
    }
}
