use regex::Regex;

pub fn validate_email(email: &str) -> bool {
    let email_regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"
    ).unwrap();

    email_regex.is_match(email) && email.len() <= 254
}

pub fn validate_phone(phone: &str) -> bool {
    let phone_regex = Regex::new(
        r"^\+?[1-9]\d{1,14}$|^\+?\d{1,4}[\s\-\.\(\)]*\d{1,14}$"
    ).unwrap();

    phone_regex.is_match(phone)
}
