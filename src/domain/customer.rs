//! Customer entity and its request/response shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::validation::{Violations, is_valid_email, is_valid_phone};

/// A bank customer as stored in the `customers` table.
///
/// The token is the customer's bearer credential; it is never serialized
/// into read responses (see [`CustomerDto`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birthday: DateTime<Utc>,
    pub email: String,
    pub phone: String,
    pub state: String,
    pub address: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Builds a new customer from an already validated request.
    #[must_use]
    pub fn from_request(request: &CustomerRequest, id: Uuid, token: String) -> Self {
        let mut customer = Self {
            id,
            first_name: String::new(),
            last_name: String::new(),
            birthday: DateTime::<Utc>::default(),
            email: String::new(),
            phone: String::new(),
            state: String::new(),
            address: String::new(),
            token,
            created_at: Utc::now(),
        };
        request.apply_to(&mut customer);
        customer
    }

    #[must_use]
    pub fn to_dto(&self) -> CustomerDto {
        CustomerDto::from(self)
    }
}

/// Public representation of a customer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct CustomerDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birthday: DateTime<Utc>,
    pub email: String,
    pub phone: String,
    pub state: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Customer> for CustomerDto {
    fn from(c: &Customer) -> Self {
        Self {
            id: c.id,
            first_name: c.first_name.clone(),
            last_name: c.last_name.clone(),
            birthday: c.birthday,
            email: c.email.clone(),
            phone: c.phone.clone(),
            state: c.state.clone(),
            address: c.address.clone(),
            created_at: c.created_at,
        }
    }
}

/// Body of `POST /api/customers` and `PUT /api/customer/{id}`.
///
/// Every field is optional at decode time so that missing fields surface as
/// violations instead of a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CustomerRequest {
    #[serde(default, alias = "FirstName")]
    pub first_name: Option<String>,
    #[serde(default, alias = "LastName")]
    pub last_name: Option<String>,
    #[serde(default, alias = "Birthday")]
    pub birthday: Option<DateTime<Utc>>,
    #[serde(default, alias = "Email")]
    pub email: Option<String>,
    #[serde(default, alias = "Phone")]
    pub phone: Option<String>,
    #[serde(default, alias = "State")]
    pub state: Option<String>,
    #[serde(default, alias = "Address")]
    pub address: Option<String>,
}

impl CustomerRequest {
    /// Checks the request, returning violations in field order.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut v = Violations::new();

        v.require("first name", self.first_name.as_deref());
        v.require("last name", self.last_name.as_deref());
        if let Some(birthday) = v.require_some("birthday", self.birthday.as_ref()) {
            if *birthday > Utc::now() {
                v.push("birthday cannot be in the future");
            }
        }
        if let Some(email) = v.require("email", self.email.as_deref()) {
            if !is_valid_email(email) {
                v.push("email is invalid");
            }
        }
        if let Some(phone) = v.require("phone", self.phone.as_deref()) {
            if !is_valid_phone(phone) {
                v.push("phone is invalid");
            }
        }
        v.require("state", self.state.as_deref());
        v.require("address", self.address.as_deref());

        v.into_vec()
    }

    /// Copies the mutable fields onto `customer`. Identifier, token and
    /// creation time are left untouched.
    pub fn apply_to(&self, customer: &mut Customer) {
        let text = |value: &Option<String>| value.as_deref().map(str::trim).unwrap_or_default().to_string();

        customer.first_name = text(&self.first_name);
        customer.last_name = text(&self.last_name);
        if let Some(birthday) = self.birthday {
            customer.birthday = birthday;
        }
        customer.email = text(&self.email);
        customer.phone = text(&self.phone);
        customer.state = text(&self.state);
        customer.address = text(&self.address);
    }
}

/// Data returned after a customer is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct CreatedCustomer {
    pub id: Uuid,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn valid_request() -> CustomerRequest {
        CustomerRequest {
            first_name: Some("John".to_string()),
            last_name: Some("Doe".to_string()),
            birthday: Some(Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap()),
            email: Some("john.doe@example.com".to_string()),
            phone: Some("+420605401050".to_string()),
            state: Some("Czechia".to_string()),
            address: Some("123 Main St".to_string()),
        }
    }

    #[test]
    fn test_valid_request_has_no_violations() {
        assert!(valid_request().validate().is_empty());
    }

    #[test]
    fn test_missing_first_name_and_state_in_order() {
        let request = CustomerRequest {
            first_name: None,
            state: None,
            ..valid_request()
        };
        assert_eq!(
            request.validate(),
            vec!["first name is required", "state is required"]
        );
    }

    #[test]
    fn test_empty_request_reports_every_field() {
        assert_eq!(
            CustomerRequest::default().validate(),
            vec![
                "first name is required",
                "last name is required",
                "birthday is required",
                "email is required",
                "phone is required",
                "state is required",
                "address is required",
            ]
        );
    }

    #[test]
    fn test_format_violations() {
        let request = CustomerRequest {
            email: Some("not-an-email".to_string()),
            phone: Some("call me".to_string()),
            birthday: Some(Utc::now() + chrono::Duration::days(2)),
            ..valid_request()
        };
        assert_eq!(
            request.validate(),
            vec![
                "birthday cannot be in the future",
                "email is invalid",
                "phone is invalid",
            ]
        );
    }

    #[test]
    fn test_pascal_case_body_is_accepted() {
        let json = r#"{
            "FirstName": "Jan",
            "LastName": "Novak",
            "Birthday": "1990-01-01T00:00:00Z",
            "Email": "jan@example.com",
            "Phone": "+420605401050",
            "State": "Vsetin",
            "Address": "Main 1"
        }"#;
        let request: CustomerRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.first_name.as_deref(), Some("Jan"));
        assert!(request.validate().is_empty());
    }

    #[test]
    fn test_apply_keeps_identity() {
        let mut customer = Customer::from_request(&valid_request(), Uuid::new_v4(), "tok".to_string());
        let id = customer.id;
        let created_at = customer.created_at;

        let update = CustomerRequest {
            first_name: Some(" Tobias ".to_string()),
            ..valid_request()
        };
        update.apply_to(&mut customer);

        assert_eq!(customer.first_name, "Tobias");
        assert_eq!(customer.id, id);
        assert_eq!(customer.created_at, created_at);
        assert_eq!(customer.token, "tok");
    }

    #[test]
    fn test_dto_hides_token() {
        let customer = Customer::from_request(&valid_request(), Uuid::new_v4(), "secret".to_string());
        let json = serde_json::to_string(&customer.to_dto()).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"first_name\":\"John\""));
    }
}
