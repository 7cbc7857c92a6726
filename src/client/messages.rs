use crate::application::validators::Field;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    Pt,
    En,
    Es,
}

impl Language {
    /// Accepts a bare code or an `Accept-Language` style value; anything
    /// unrecognized falls back to Portuguese.
    pub fn from_raw(raw: Option<&str>) -> Self {
        let candidate = raw
            .unwrap_or("pt")
            .split(',')
            .next()
            .unwrap_or("pt")
            .split(['-', '_', ';'])
            .next()
            .unwrap_or("pt")
            .trim()
            .to_lowercase();
        match candidate.as_str() {
            "en" => Language::En,
            "es" => Language::Es,
            _ => Language::Pt,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Pt => "pt",
            Language::En => "en",
            Language::Es => "es",
        }
    }

    pub fn messages(&self) -> &'static Messages {
        match self {
            Language::Pt => &PT,
            Language::En => &EN,
            Language::Es => &ES,
        }
    }
}

/// User-facing copy for the waitlist modal.
#[derive(Debug)]
pub struct Messages {
    pub success_title: &'static str,
    pub success_message: &'static str,
    pub name_required: &'static str,
    pub name_min_length: &'static str,
    pub email_required: &'static str,
    pub email_invalid: &'static str,
    pub company_required: &'static str,
    pub position_required: &'static str,
    pub duplicate_email: &'static str,
    pub rate_limited: &'static str,
    pub submit_error: &'static str,
}

static PT: Messages = Messages {
    success_title: "Você está na lista!",
    success_message: "Entraremos em contato em breve com acesso antecipado.",
    name_required: "Nome é obrigatório",
    name_min_length: "Nome deve ter pelo menos 2 caracteres",
    email_required: "Email é obrigatório",
    email_invalid: "Por favor, insira um email válido",
    company_required: "Empresa é obrigatória",
    position_required: "Cargo é obrigatório",
    duplicate_email: "Este email já está cadastrado na lista de espera.",
    rate_limited: "Muitas tentativas. Por favor, aguarde um momento antes de tentar novamente.",
    submit_error: "Algo deu errado. Por favor, tente novamente.",
};

static EN: Messages = Messages {
    success_title: "You're on the list!",
    success_message: "We'll be in touch soon with early access.",
    name_required: "Name is required",
    name_min_length: "Name must be at least 2 characters",
    email_required: "Email is required",
    email_invalid: "Please enter a valid email address",
    company_required: "Company is required",
    position_required: "Position is required",
    duplicate_email: "This email is already on the waitlist.",
    rate_limited: "Too many attempts. Please wait a moment before trying again.",
    submit_error: "Something went wrong. Please try again.",
};

static ES: Messages = Messages {
    success_title: "¡Estás en la lista!",
    success_message: "Nos pondremos en contacto pronto con acceso anticipado.",
    name_required: "El nombre es obligatorio",
    name_min_length: "El nombre debe tener al menos 2 caracteres",
    email_required: "El email es obligatorio",
    email_invalid: "Por favor, ingresa un email válido",
    company_required: "La empresa es obligatoria",
    position_required: "El cargo es obligatorio",
    duplicate_email: "Este email ya está en la lista de espera.",
    rate_limited: "Demasiados intentos. Por favor, espera un momento antes de intentarlo de nuevo.",
    submit_error: "Algo salió mal. Por favor, intenta de nuevo.",
};

impl Messages {
    /// Localized copy for a rule message produced by the shared validator.
    /// Rules without a translation keep the validator's wording.
    pub fn field_error(&self, field: Field, rule_message: &str) -> String {
        let localized = match (field, rule_message) {
            (Field::Name, "Name is required") => Some(self.name_required),
            (Field::Name, "Name must be at least 2 characters") => Some(self.name_min_length),
            (Field::Email, "Email is required") => Some(self.email_required),
            (Field::Email, "Invalid email" | "Email must not be empty") => {
                Some(self.email_invalid)
            }
            (Field::Company, "Company is required" | "Company name must not be empty") => {
                Some(self.company_required)
            }
            (Field::Position, "Position is required" | "Position must not be empty") => {
                Some(self.position_required)
            }
            _ => None,
        };
        localized.unwrap_or(rule_message).to_string()
    }
}
