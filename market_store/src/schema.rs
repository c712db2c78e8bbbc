//! Diesel table definitions for the two sinks.
//!
//! The DDL itself lives in [`crate::columns`]; these declarations only have to agree
//! with it on names and SQL types. Neither table has a real primary key, the keys
//! below only satisfy `table!`.

diesel::table! {
    /// One typed row per asset per cycle.
    market_data (id, timestamp) {
        /// VARCHAR(64)
        id -> Text,
        /// VARCHAR(32)
        symbol -> Text,
        /// VARCHAR(128)
        name -> Text,
        /// DECIMAL(20,8), bound as its exact decimal text.
        current_price -> Nullable<Text>,
        /// BIGINT
        market_cap -> Nullable<BigInt>,
        /// BIGINT
        total_volume -> Nullable<BigInt>,
        /// DATETIME, the cycle's collection time.
        timestamp -> Timestamp,
    }
}

diesel::table! {
    /// One serialized document per asset per cycle.
    market_data_json (collected_at, payload) {
        /// DATETIME, the cycle's collection time.
        collected_at -> Timestamp,
        /// TEXT, the whole document as one JSON object.
        payload -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(market_data, market_data_json);
