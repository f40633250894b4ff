// src/services/numeracao.rs
//
// Numeração sequencial das propostas: PRP-<ano>-<sequência com 4 dígitos>.
//
// A sequência é por ano e vive num contador próprio (tabela
// proposta_sequencias no Postgres, mapa no repositório em memória), lido e
// gravado na MESMA transação do insert da proposta. Números de rascunhos
// apagados não são reaproveitados.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const PREFIXO: &str = "PRP";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NumeroProposta {
    ano: i32,
    sequencia: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Número de proposta inválido: '{0}'")]
pub struct NumeroInvalido(pub String);

impl NumeroProposta {
    pub fn new(ano: i32, sequencia: u32) -> Self {
        Self { ano, sequencia }
    }

    /// Próximo número do ano, dado o último já alocado (None = primeiro do ano).
    pub fn proximo(ano: i32, ultima_sequencia: Option<u32>) -> Self {
        Self::new(ano, ultima_sequencia.unwrap_or(0) + 1)
    }

    pub fn ano(&self) -> i32 {
        self.ano
    }

    pub fn sequencia(&self) -> u32 {
        self.sequencia
    }
}

// Acima de 9999 o número simplesmente fica mais largo (PRP-2026-10000).
impl fmt::Display for NumeroProposta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{:04}", PREFIXO, self.ano, self.sequencia)
    }
}

impl FromStr for NumeroProposta {
    type Err = NumeroInvalido;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalido = || NumeroInvalido(s.to_string());

        let mut partes = s.split('-');
        let (Some(PREFIXO), Some(ano), Some(seq), None) =
            (partes.next(), partes.next(), partes.next(), partes.next())
        else {
            return Err(invalido());
        };

        if ano.len() != 4 || seq.len() < 4 {
            return Err(invalido());
        }
        let ano = ano.parse::<i32>().map_err(|_| invalido())?;
        let sequencia = seq.parse::<u32>().map_err(|_| invalido())?;
        if sequencia == 0 {
            return Err(invalido());
        }

        Ok(Self { ano, sequencia })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_four_digit_padding() {
        assert_eq!(NumeroProposta::new(2026, 1).to_string(), "PRP-2026-0001");
        assert_eq!(NumeroProposta::new(2026, 42).to_string(), "PRP-2026-0042");
        assert_eq!(NumeroProposta::new(2026, 9999).to_string(), "PRP-2026-9999");
    }

    #[test]
    fn overflow_past_9999_widens_instead_of_failing() {
        let numero = NumeroProposta::proximo(2026, Some(9999));
        assert_eq!(numero.to_string(), "PRP-2026-10000");
        assert_eq!("PRP-2026-10000".parse::<NumeroProposta>().unwrap(), numero);
    }

    #[test]
    fn first_of_the_year_starts_at_one() {
        assert_eq!(NumeroProposta::proximo(2027, None), NumeroProposta::new(2027, 1));
        assert_eq!(NumeroProposta::proximo(2027, Some(7)).sequencia(), 8);
    }

    #[test]
    fn parses_back_what_it_formats() {
        let numero: NumeroProposta = "PRP-2025-0137".parse().unwrap();
        assert_eq!(numero.ano(), 2025);
        assert_eq!(numero.sequencia(), 137);
    }

    #[test]
    fn rejects_malformed_identifiers() {
        for s in ["", "PRP-2026", "PRP-2026-1", "ABC-2026-0001", "PRP-26-0001", "PRP-2026-00x1", "PRP-2026-0000", "PRP-2026-0001-9"] {
            assert!(s.parse::<NumeroProposta>().is_err(), "{s} deveria ser inválido");
        }
    }

    #[test]
    fn orders_by_year_then_sequence() {
        let mut numeros = vec![
            NumeroProposta::new(2026, 2),
            NumeroProposta::new(2025, 900),
            NumeroProposta::new(2026, 1),
        ];
        numeros.sort();
        assert_eq!(
            numeros,
            vec![NumeroProposta::new(2025, 900), NumeroProposta::new(2026, 1), NumeroProposta::new(2026, 2)]
        );
    }
}
