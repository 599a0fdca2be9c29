//! Built-in catalog of the core Keycloak tables (MySQL dialect, as created
//! by the Keycloak migrations).

use super::schema::{ColumnDefinition, TableDefinition};

fn varchar(name: &str, length: i64) -> ColumnDefinition {
    ColumnDefinition::new(name, "VARCHAR").length(length)
}

fn id() -> ColumnDefinition {
    varchar("ID", 36).primary_key()
}

fn flag(name: &str) -> ColumnDefinition {
    ColumnDefinition::new(name, "BIT(1)")
        .not_null()
        .default_value("b'0'")
}

fn int(name: &str) -> ColumnDefinition {
    ColumnDefinition::new(name, "INT")
}

fn bigint(name: &str) -> ColumnDefinition {
    ColumnDefinition::new(name, "BIGINT")
}

fn text(name: &str) -> ColumnDefinition {
    ColumnDefinition::new(name, "TEXT")
}

fn long_text(name: &str) -> ColumnDefinition {
    ColumnDefinition::new(name, "LONGTEXT")
}

fn attribute_table(name: &str, owner: &str) -> TableDefinition {
    TableDefinition::new(name)
        .column(varchar("NAME", 255).primary_key())
        .column(long_text("VALUE"))
        .column(varchar(owner, 36).primary_key())
}

fn realm() -> TableDefinition {
    TableDefinition::new("REALM")
        .comment("A realm: an isolated set of users, clients and settings.")
        .column(id())
        .column(int("ACCESS_CODE_LIFESPAN"))
        .column(int("USER_ACTION_LIFESPAN"))
        .column(int("ACCESS_TOKEN_LIFESPAN"))
        .column(varchar("ACCOUNT_THEME", 255))
        .column(varchar("ADMIN_THEME", 255))
        .column(varchar("EMAIL_THEME", 255))
        .column(flag("ENABLED"))
        .column(flag("EVENTS_ENABLED"))
        .column(bigint("EVENTS_EXPIRATION"))
        .column(varchar("LOGIN_THEME", 255))
        .column(varchar("NAME", 255))
        .column(int("NOT_BEFORE"))
        .column(varchar("PASSWORD_POLICY", 2550))
        .column(flag("REGISTRATION_ALLOWED"))
        .column(flag("REMEMBER_ME"))
        .column(flag("RESET_PASSWORD_ALLOWED"))
        .column(flag("SOCIAL"))
        .column(varchar("SSL_REQUIRED", 255))
        .column(int("SSO_IDLE_TIMEOUT"))
        .column(int("SSO_MAX_LIFESPAN"))
        .column(flag("UPDATE_PROFILE_ON_SOC_LOGIN"))
        .column(flag("VERIFY_EMAIL"))
        .column(varchar("MASTER_ADMIN_CLIENT", 36))
        .column(int("LOGIN_LIFESPAN"))
        .column(flag("INTERNATIONALIZATION_ENABLED"))
        .column(varchar("DEFAULT_LOCALE", 255))
        .column(flag("REG_EMAIL_AS_USERNAME"))
        .column(flag("ADMIN_EVENTS_ENABLED"))
        .column(flag("ADMIN_EVENTS_DETAILS_ENABLED"))
        .column(flag("EDIT_USERNAME_ALLOWED"))
        .column(int("OTP_POLICY_COUNTER").default_value("0"))
        .column(int("OTP_POLICY_WINDOW").default_value("1"))
        .column(int("OTP_POLICY_PERIOD").default_value("30"))
        .column(int("OTP_POLICY_DIGITS").default_value("6"))
        .column(varchar("OTP_POLICY_ALG", 36).default_value("'HmacSHA1'"))
        .column(varchar("OTP_POLICY_TYPE", 36).default_value("'totp'"))
        .column(varchar("BROWSER_FLOW", 36))
        .column(varchar("REGISTRATION_FLOW", 36))
        .column(varchar("DIRECT_GRANT_FLOW", 36))
        .column(varchar("RESET_CREDENTIALS_FLOW", 36))
        .column(varchar("CLIENT_AUTH_FLOW", 36))
        .column(int("OFFLINE_SESSION_IDLE_TIMEOUT").default_value("0"))
        .column(flag("REVOKE_REFRESH_TOKEN"))
        .column(int("ACCESS_TOKEN_LIFE_IMPLICIT").default_value("0"))
        .column(flag("LOGIN_WITH_EMAIL_ALLOWED").default_value("b'1'"))
        .column(flag("DUPLICATE_EMAILS_ALLOWED"))
        .column(varchar("DOCKER_AUTH_FLOW", 36))
        .column(int("REFRESH_TOKEN_MAX_REUSE").default_value("0"))
        .column(flag("ALLOW_USER_MANAGED_ACCESS"))
        .column(int("SSO_MAX_LIFESPAN_REMEMBER_ME").not_null())
        .column(int("SSO_IDLE_TIMEOUT_REMEMBER_ME").not_null())
        .column(varchar("DEFAULT_ROLE", 255))
}

fn client() -> TableDefinition {
    TableDefinition::new("CLIENT")
        .column(id())
        .column(flag("ENABLED"))
        .column(flag("FULL_SCOPE_ALLOWED"))
        .column(varchar("CLIENT_ID", 255))
        .column(int("NOT_BEFORE"))
        .column(flag("PUBLIC_CLIENT"))
        .column(varchar("SECRET", 255))
        .column(varchar("BASE_URL", 255))
        .column(flag("BEARER_ONLY"))
        .column(varchar("MANAGEMENT_URL", 255))
        .column(flag("SURROGATE_AUTH_REQUIRED"))
        .column(varchar("REALM_ID", 36))
        .column(varchar("PROTOCOL", 255))
        .column(int("NODE_REREG_TIMEOUT").default_value("0"))
        .column(flag("FRONTCHANNEL_LOGOUT"))
        .column(flag("CONSENT_REQUIRED"))
        .column(varchar("NAME", 255))
        .column(flag("SERVICE_ACCOUNTS_ENABLED"))
        .column(varchar("CLIENT_AUTHENTICATOR_TYPE", 255))
        .column(varchar("ROOT_URL", 255))
        .column(varchar("DESCRIPTION", 255))
        .column(varchar("REGISTRATION_TOKEN", 255))
        .column(flag("STANDARD_FLOW_ENABLED").default_value("b'1'"))
        .column(flag("IMPLICIT_FLOW_ENABLED"))
        .column(flag("DIRECT_ACCESS_GRANTS_ENABLED"))
        .column(flag("ALWAYS_DISPLAY_IN_CONSOLE"))
}

fn client_scope() -> TableDefinition {
    TableDefinition::new("CLIENT_SCOPE")
        .column(id())
        .column(varchar("NAME", 255))
        .column(varchar("REALM_ID", 36))
        .column(varchar("DESCRIPTION", 255))
        .column(varchar("PROTOCOL", 255))
}

fn user_entity() -> TableDefinition {
    TableDefinition::new("USER_ENTITY")
        .comment("A user account within a realm.")
        .column(id())
        .column(varchar("EMAIL", 255))
        .column(varchar("EMAIL_CONSTRAINT", 255))
        .column(flag("EMAIL_VERIFIED"))
        .column(flag("ENABLED"))
        .column(varchar("FEDERATION_LINK", 255))
        .column(varchar("FIRST_NAME", 255))
        .column(varchar("LAST_NAME", 255))
        .column(varchar("REALM_ID", 255))
        .column(varchar("USERNAME", 255))
        .column(bigint("CREATED_TIMESTAMP"))
        .column(varchar("SERVICE_ACCOUNT_CLIENT_LINK", 255))
        .column(int("NOT_BEFORE").not_null().default_value("0"))
}

fn credential() -> TableDefinition {
    TableDefinition::new("CREDENTIAL")
        .column(id())
        .column(ColumnDefinition::new("SALT", "TINYBLOB"))
        .column(varchar("TYPE", 255))
        .column(varchar("USER_ID", 36))
        .column(bigint("CREATED_DATE"))
        .column(varchar("USER_LABEL", 255))
        .column(long_text("SECRET_DATA"))
        .column(long_text("CREDENTIAL_DATA"))
        .column(int("PRIORITY"))
}

fn user_session() -> TableDefinition {
    TableDefinition::new("USER_SESSION")
        .comment("Persisted browser session of an authenticated user.")
        .column(id())
        .column(varchar("AUTH_METHOD", 255))
        .column(varchar("IP_ADDRESS", 255))
        .column(int("LAST_SESSION_REFRESH"))
        .column(varchar("LOGIN_USERNAME", 255))
        .column(varchar("REALM_ID", 255))
        .column(flag("REMEMBER_ME"))
        .column(int("STARTED"))
        .column(varchar("USER_ID", 255))
        .column(int("USER_SESSION_STATE"))
        .column(varchar("BROKER_SESSION_ID", 255))
        .column(varchar("BROKER_USER_ID", 255))
}

fn client_session() -> TableDefinition {
    TableDefinition::new("CLIENT_SESSION")
        .column(id())
        .column(varchar("CLIENT_ID", 36))
        .column(varchar("REDIRECT_URI", 255))
        .column(varchar("STATE", 255))
        .column(int("TIMESTAMP"))
        .column(varchar("SESSION_ID", 36))
        .column(varchar("AUTH_METHOD", 255))
        .column(varchar("REALM_ID", 255))
        .column(varchar("AUTH_USER_ID", 36))
        .column(varchar("CURRENT_ACTION", 36))
}

fn offline_user_session() -> TableDefinition {
    TableDefinition::new("OFFLINE_USER_SESSION")
        .column(varchar("USER_SESSION_ID", 36).primary_key())
        .column(varchar("USER_ID", 255))
        .column(varchar("REALM_ID", 36).not_null())
        .column(int("CREATED_ON").not_null())
        .column(varchar("OFFLINE_FLAG", 4).primary_key())
        .column(long_text("DATA"))
        .column(int("LAST_SESSION_REFRESH").not_null().default_value("0"))
}

fn offline_client_session() -> TableDefinition {
    TableDefinition::new("OFFLINE_CLIENT_SESSION")
        .column(varchar("USER_SESSION_ID", 36).primary_key())
        .column(varchar("CLIENT_ID", 255).primary_key())
        .column(varchar("OFFLINE_FLAG", 4).primary_key())
        .column(int("TIMESTAMP"))
        .column(long_text("DATA"))
        .column(varchar("CLIENT_STORAGE_PROVIDER", 36).primary_key())
        .column(varchar("EXTERNAL_CLIENT_ID", 255).primary_key())
}

fn keycloak_role() -> TableDefinition {
    TableDefinition::new("KEYCLOAK_ROLE")
        .column(id())
        .column(varchar("CLIENT_REALM_CONSTRAINT", 255))
        .column(flag("CLIENT_ROLE"))
        .column(varchar("DESCRIPTION", 255))
        .column(varchar("NAME", 255))
        .column(varchar("REALM_ID", 255))
        .column(varchar("CLIENT", 36))
        .column(varchar("REALM", 36))
}

fn composite_role() -> TableDefinition {
    TableDefinition::new("COMPOSITE_ROLE")
        .column(varchar("COMPOSITE", 36).primary_key())
        .column(varchar("CHILD_ROLE", 36).primary_key())
}

fn user_role_mapping() -> TableDefinition {
    TableDefinition::new("USER_ROLE_MAPPING")
        .column(varchar("ROLE_ID", 255).primary_key())
        .column(varchar("USER_ID", 36).primary_key())
}

fn keycloak_group() -> TableDefinition {
    TableDefinition::new("KEYCLOAK_GROUP")
        .column(id())
        .column(varchar("NAME", 255))
        .column(varchar("PARENT_GROUP", 36).not_null())
        .column(varchar("REALM_ID", 36))
}

fn user_group_membership() -> TableDefinition {
    TableDefinition::new("USER_GROUP_MEMBERSHIP")
        .column(varchar("GROUP_ID", 36).primary_key())
        .column(varchar("USER_ID", 36).primary_key())
}

fn user_attribute() -> TableDefinition {
    TableDefinition::new("USER_ATTRIBUTE")
        .column(varchar("NAME", 255).not_null())
        .column(varchar("VALUE", 255))
        .column(varchar("USER_ID", 36).not_null())
        .column(varchar("ID", 36).primary_key().default_value("'sybase-needs-something-here'"))
}

fn user_required_action() -> TableDefinition {
    TableDefinition::new("USER_REQUIRED_ACTION")
        .column(varchar("USER_ID", 36).primary_key())
        .column(varchar("REQUIRED_ACTION", 255).primary_key().default_value("' '"))
}

fn protocol_mapper() -> TableDefinition {
    TableDefinition::new("PROTOCOL_MAPPER")
        .column(id())
        .column(varchar("NAME", 255).not_null())
        .column(varchar("PROTOCOL", 255).not_null())
        .column(varchar("PROTOCOL_MAPPER_NAME", 255).not_null())
        .column(varchar("CLIENT_ID", 36))
        .column(varchar("CLIENT_SCOPE_ID", 36))
}

fn event_entity() -> TableDefinition {
    TableDefinition::new("EVENT_ENTITY")
        .column(id())
        .column(varchar("CLIENT_ID", 255))
        .column(varchar("DETAILS_JSON", 2550))
        .column(varchar("ERROR", 255))
        .column(varchar("IP_ADDRESS", 255))
        .column(varchar("REALM_ID", 255))
        .column(varchar("SESSION_ID", 255))
        .column(bigint("EVENT_TIME"))
        .column(varchar("TYPE", 255))
        .column(varchar("USER_ID", 255))
        .column(text("DETAILS_JSON_LONG_VALUE"))
}

fn admin_event_entity() -> TableDefinition {
    TableDefinition::new("ADMIN_EVENT_ENTITY")
        .column(id())
        .column(bigint("ADMIN_EVENT_TIME"))
        .column(varchar("REALM_ID", 255))
        .column(varchar("OPERATION_TYPE", 255))
        .column(varchar("AUTH_REALM_ID", 255))
        .column(varchar("AUTH_CLIENT_ID", 255))
        .column(varchar("AUTH_USER_ID", 255))
        .column(varchar("IP_ADDRESS", 255))
        .column(varchar("RESOURCE_PATH", 2550))
        .column(text("REPRESENTATION"))
        .column(varchar("ERROR", 255))
        .column(varchar("RESOURCE_TYPE", 64))
}

fn migration_model() -> TableDefinition {
    TableDefinition::new("MIGRATION_MODEL")
        .column(id())
        .column(varchar("VERSION", 36))
        .column(bigint("UPDATE_TIME").not_null().default_value("0"))
}

fn databasechangeloglock() -> TableDefinition {
    TableDefinition::new("DATABASECHANGELOGLOCK")
        .column(int("ID").primary_key())
        .column(flag("LOCKED"))
        .column(ColumnDefinition::new("LOCKGRANTED", "DATETIME"))
        .column(varchar("LOCKEDBY", 255))
}

/// Definitions for every built-in Keycloak table, in no particular order.
pub fn keycloak_tables() -> Vec<TableDefinition> {
    vec![
        realm(),
        attribute_table("REALM_ATTRIBUTE", "REALM_ID"),
        client(),
        attribute_table("CLIENT_ATTRIBUTES", "CLIENT_ID"),
        client_scope(),
        attribute_table("CLIENT_SCOPE_ATTRIBUTES", "SCOPE_ID"),
        user_entity(),
        user_attribute(),
        user_required_action(),
        credential(),
        user_session(),
        TableDefinition::new("USER_SESSION_NOTE")
            .column(varchar("USER_SESSION", 36).primary_key())
            .column(varchar("NAME", 255).primary_key())
            .column(varchar("VALUE", 2048)),
        client_session(),
        TableDefinition::new("CLIENT_SESSION_NOTE")
            .column(varchar("NAME", 255).primary_key())
            .column(varchar("VALUE", 255))
            .column(varchar("CLIENT_SESSION", 36).primary_key()),
        offline_user_session(),
        offline_client_session(),
        keycloak_role(),
        composite_role(),
        user_role_mapping(),
        keycloak_group(),
        attribute_table("GROUP_ATTRIBUTE", "GROUP_ID"),
        user_group_membership(),
        protocol_mapper(),
        event_entity(),
        admin_event_entity(),
        migration_model(),
        databasechangeloglock(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_names_are_unique() {
        let tables = keycloak_tables();
        let names: HashSet<String> = tables.iter().map(|t| t.name.to_lowercase()).collect();
        assert_eq!(names.len(), tables.len());
    }

    #[test]
    fn test_primary_keys_are_not_nullable() {
        for table in keycloak_tables() {
            for column in table.columns.iter().filter(|c| c.is_primary_key) {
                assert!(!column.is_nullable, "{}.{}", table.name, column.name);
            }
        }
    }
}
