//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Local mirror of auth-provider users plus onboarding answers and
    /// notification switches.
    users (id) {
        id -> Uuid,
        auth_subject -> Varchar,
        email -> Varchar,
        name -> Nullable<Varchar>,
        onboarding_goal -> Nullable<Varchar>,
        net_worth_range -> Nullable<Varchar>,
        institution_count -> Nullable<Varchar>,
        entity_count -> Nullable<Varchar>,
        primary_concern -> Nullable<Varchar>,
        weekly_digest -> Bool,
        insight_alerts -> Bool,
        tax_alerts -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// At most one subscription per user, keyed by `user_id`.
    subscriptions (user_id) {
        user_id -> Uuid,
        plan -> Varchar,
        billing_interval -> Varchar,
        status -> Varchar,
        stripe_customer_id -> Nullable<Varchar>,
        stripe_subscription_id -> Nullable<Varchar>,
        current_period_end -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    entities (id) {
        id -> Uuid,
        user_id -> Uuid,
        name -> Varchar,
        kind -> Varchar,
        jurisdiction -> Varchar,
        parent_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Holdings. `value_cents` is signed: liabilities are negative.
    assets (id) {
        id -> Uuid,
        user_id -> Uuid,
        entity_id -> Nullable<Uuid>,
        name -> Varchar,
        category -> Varchar,
        value_cents -> Int8,
        currency -> Varchar,
        change_24h -> Nullable<Float8>,
        change_30d -> Nullable<Float8>,
        institution -> Nullable<Varchar>,
        account_mask -> Nullable<Varchar>,
        notes -> Nullable<Text>,
        source -> Varchar,
        plaid_account_id -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    documents (id) {
        id -> Uuid,
        user_id -> Uuid,
        entity_id -> Nullable<Uuid>,
        name -> Varchar,
        file_name -> Varchar,
        file_size -> Int8,
        mime_type -> Varchar,
        blob_url -> Varchar,
        category -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    insights (id) {
        id -> Uuid,
        user_id -> Uuid,
        title -> Varchar,
        description -> Text,
        category -> Varchar,
        priority -> Varchar,
        actionable -> Bool,
        dismissed -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Linked institution credentials. The access token is stored sealed.
    plaid_items (id) {
        id -> Uuid,
        user_id -> Uuid,
        plaid_item_id -> Varchar,
        access_token_ciphertext -> Varchar,
        access_token_nonce -> Varchar,
        institution_id -> Nullable<Varchar>,
        institution_name -> Nullable<Varchar>,
        status -> Varchar,
        error_code -> Nullable<Varchar>,
        last_synced_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    plaid_accounts (id) {
        id -> Uuid,
        item_id -> Uuid,
        plaid_account_id -> Varchar,
        name -> Varchar,
        official_name -> Nullable<Varchar>,
        account_type -> Varchar,
        subtype -> Nullable<Varchar>,
        mask -> Nullable<Varchar>,
        current_balance_cents -> Nullable<Int8>,
        available_balance_cents -> Nullable<Int8>,
        iso_currency_code -> Varchar,
        last_synced_at -> Timestamptz,
    }
}

diesel::joinable!(assets -> entities (entity_id));
diesel::joinable!(documents -> entities (entity_id));
diesel::joinable!(plaid_accounts -> plaid_items (item_id));
diesel::joinable!(subscriptions -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    subscriptions,
    entities,
    assets,
    documents,
    insights,
    plaid_items,
    plaid_accounts,
);
